//! Token-bound adapter
//!
//! A `TokenAdapter` is permanently bound to one target token at
//! construction and exposes the integer-coded surface the host ledger
//! consumes: a boolean read-only query, a restriction-code query, a message
//! lookup, and the mutating entry point used when a transfer actually
//! executes.

use std::sync::Arc;

use crate::{
    engine::{PolicyEngine, ValidatorIdentity},
    registry::RestrictionRegistry,
    types::restriction::{EvaluationOutcome, RestrictionCode},
    validator::{BridgeCore, EvalMode, TransferValidator, WriteCapability},
};

/// Bridge validator bound to a single target token.
pub struct TokenAdapter {
    token_id: String,
    core: BridgeCore,
}

impl TokenAdapter {
    /// Binds an adapter to a target token.
    ///
    /// Returns the adapter together with its one [`WriteCapability`], which
    /// the owning ledger holds; the binding and the adapter's identity are
    /// immutable afterwards.
    pub fn bind(
        token_id: impl Into<String>,
        identity: ValidatorIdentity,
        engine: Arc<dyn PolicyEngine>,
        registry: Arc<RestrictionRegistry>,
    ) -> (Self, WriteCapability) {
        let adapter = Self {
            token_id: token_id.into(),
            core: BridgeCore::new(identity, engine, registry),
        };
        (adapter, WriteCapability::mint())
    }

    /// The bound target token.
    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    /// The adapter's policy-registration identity.
    pub fn identity(&self) -> &ValidatorIdentity {
        self.core.identity()
    }

    /// Read-only boolean query: may this transfer proceed?
    pub fn validate_transfer(&self, from: &str, to: &str, amount: u64) -> bool {
        self.core.evaluate(from, to, amount, EvalMode::ReadOnly).allowed
    }

    /// Read-only restriction-code query.
    pub fn detect_transfer_restriction(&self, from: &str, to: &str, amount: u64) -> RestrictionCode {
        self.core.evaluate(from, to, amount, EvalMode::ReadOnly).code
    }

    /// Message lookup for a restriction code.
    pub fn message_for_transfer_restriction(&self, code: RestrictionCode) -> String {
        self.core.registry().message_for(code)
    }

    /// Mutating entry point: evaluates and, on success, lets the engine
    /// apply cumulative state and fire hooks. Requires the adapter's write
    /// capability.
    pub fn operate_on_transfer(
        &self,
        cap: &WriteCapability,
        from: &str,
        to: &str,
        amount: u64,
    ) -> RestrictionCode {
        self.core.evaluate(from, to, amount, EvalMode::Mutating(cap)).code
    }
}

impl TransferValidator for TokenAdapter {
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
