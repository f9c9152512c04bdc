//! Transfer validators
//!
//! A validator is anything implementing [`TransferValidator`]: build a call
//! payload from `(from, to, amount)`, dispatch to the engine entry point
//! matching the caller's capability, and map the outcome to a restriction
//! code and message. Two concrete flavors ship here, the token-bound
//! [`TokenAdapter`](adapter::TokenAdapter) and the token-agnostic
//! [`ComplianceRule`](rule::ComplianceRule), and rule sets compose any mix
//! of them behind the same trait.
//!
//! The read-only/mutating capability split is enforced in the type system:
//! [`EvalMode::Mutating`] cannot be constructed without a
//! [`WriteCapability`], and capabilities are minted exactly once per
//! adapter or rule, at construction, for the integrating ledger to hold.

pub mod adapter;
pub mod rule;

use std::sync::Arc;

use tracing::debug;

use crate::{
    engine::{failure::classify, PolicyEngine, ValidatorIdentity},
    registry::RestrictionRegistry,
    types::{
        payload::{encode_transfer_from, CallPayload, OP_TRANSFER_FROM},
        restriction::EvaluationOutcome,
    },
};

/// Proof of write access to the bridge.
///
/// Minted once at adapter/rule construction and handed to the owning
/// ledger. Not cloneable: holding a `&WriteCapability` is the only way to
/// construct a mutating evaluation, so read-only code paths are structurally
/// unable to reach the mutating engine entry point.
#[derive(Debug)]
pub struct WriteCapability {
    _private: (),
}

impl WriteCapability {
    pub(crate) fn mint() -> Self {
        Self { _private: () }
    }
}

/// Whether an evaluation may produce persistent side effects.
#[derive(Debug, Clone, Copy)]
pub enum EvalMode<'a> {
    /// No persistent side effects; safe from read-only code paths.
    ReadOnly,
    /// May update cumulative policy state and fire hooks. Requires proof of
    /// write access.
    Mutating(&'a WriteCapability),
}

impl EvalMode<'_> {
    /// True for the mutating mode.
    pub fn is_mutating(&self) -> bool {
        matches!(self, EvalMode::Mutating(_))
    }
}

/// Polymorphic validator capability.
///
/// Adapters, rules, rule sets, and third-party validators all sit behind
/// this single trait, so heterogeneous validators compose freely.
pub trait TransferValidator: Send + Sync {
    /// Evaluates a transfer under the given capability mode.
    fn evaluate(&self, from: &str, to: &str, amount: u64, mode: EvalMode<'_>)
        -> EvaluationOutcome;
}

/// Shared evaluation core used by both validator flavors.
///
/// Holds the fixed validator identity, the engine binding, and the message
/// registry. The identity is the engine's policy-registration key, which is
/// what makes a validator reusable across many targets.
pub(crate) struct BridgeCore {
    identity: ValidatorIdentity,
    engine: Arc<dyn PolicyEngine>,
    registry: Arc<RestrictionRegistry>,
}

impl BridgeCore {
    pub(crate) fn new(
        identity: ValidatorIdentity,
        engine: Arc<dyn PolicyEngine>,
        registry: Arc<RestrictionRegistry>,
    ) -> Self {
        Self {
            identity,
            engine,
            registry,
        }
    }

    pub(crate) fn identity(&self) -> &ValidatorIdentity {
        &self.identity
    }

    pub(crate) fn registry(&self) -> &RestrictionRegistry {
        &self.registry
    }

    /// Builds the payload, dispatches by mode, and maps the engine outcome.
    pub(crate) fn evaluate(
        &self,
        from: &str,
        to: &str,
        amount: u64,
        mode: EvalMode<'_>,
    ) -> EvaluationOutcome {
        let raw_data = match encode_transfer_from(from, to, amount) {
            Ok(raw) => raw,
            Err(e) => {
                // Cannot reach the engine without a payload; classify as an
                // unknown compliance error.
                debug!(error = %e, "payload encoding failed");
                let code = crate::types::restriction::RestrictionCode::UNKNOWN_ERROR;
                return EvaluationOutcome::rejected(code, self.registry.message_for(code));
            }
        };
        let payload = CallPayload::new(OP_TRANSFER_FROM, from, raw_data);

        let result = match mode {
            EvalMode::ReadOnly => self.engine.check(&self.identity, &payload),
            EvalMode::Mutating(_) => self.engine.run(&self.identity, &payload),
        };

        match result {
            Ok(()) => EvaluationOutcome::allowed(),
            Err(blob) => {
                let failure = classify(&blob);
                let code = failure.restriction_code();
                let message = match failure.reason() {
                    Some(reason) if !reason.is_empty() => reason.to_string(),
                    _ => self.registry.message_for(code),
                };
                debug!(identity = %self.identity, %code, mutating = mode.is_mutating(), "transfer rejected");
                EvaluationOutcome::rejected(code, message)
            }
        }
    }
}
