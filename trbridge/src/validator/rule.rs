//! Token-agnostic compliance rule
//!
//! A `ComplianceRule` is not bound to any target token: policy lookup keys
//! on the rule's own identity, so a single rule instance can serve many
//! targets with one shared policy set. Its surface is deliberately limited
//! to booleans and message strings, with no integer-code query, which keeps
//! the composition protocol to a single boolean contract.

use std::sync::Arc;

use crate::{
    engine::{PolicyEngine, ValidatorIdentity},
    registry::RestrictionRegistry,
    types::restriction::EvaluationOutcome,
    validator::{BridgeCore, EvalMode, TransferValidator, WriteCapability},
};

/// Reusable, target-agnostic bridge validator.
pub struct ComplianceRule {
    core: BridgeCore,
}

impl ComplianceRule {
    /// Creates a rule with the given identity.
    ///
    /// Returns the rule together with its one [`WriteCapability`]; the
    /// identity is immutable afterwards and is the key under which the
    /// engine resolves this rule's policies, whichever target routes
    /// through it.
    pub fn new(
        identity: ValidatorIdentity,
        engine: Arc<dyn PolicyEngine>,
        registry: Arc<RestrictionRegistry>,
    ) -> (Self, WriteCapability) {
        let rule = Self {
            core: BridgeCore::new(identity, engine, registry),
        };
        (rule, WriteCapability::mint())
    }

    /// The rule's policy-registration identity.
    pub fn identity(&self) -> &ValidatorIdentity {
        self.core.identity()
    }

    /// Read-only boolean query: may this transfer proceed?
    pub fn is_transfer_valid(&self, from: &str, to: &str, amount: u64) -> bool {
        self.core.evaluate(from, to, amount, EvalMode::ReadOnly).allowed
    }

    /// Read-only message query for this transfer's outcome.
    pub fn restriction_message(&self, from: &str, to: &str, amount: u64) -> String {
        let outcome = self.core.evaluate(from, to, amount, EvalMode::ReadOnly);
        if outcome.allowed {
            self.core.registry().message_for(outcome.code)
        } else {
            outcome.message
        }
    }

    /// Mutating boolean entry point. Requires the rule's write capability.
    pub fn run_transfer(&self, cap: &WriteCapability, from: &str, to: &str, amount: u64) -> bool {
        self.core
            .evaluate(from, to, amount, EvalMode::Mutating(cap))
            .allowed
    }
}

impl TransferValidator for ComplianceRule {
    fn evaluate(
        &self,
        from: &str,
        to: &str,
        amount: u64,
        mode: EvalMode<'_>,
    ) -> EvaluationOutcome {
        self.core.evaluate(from, to, amount, mode)
    }
}
