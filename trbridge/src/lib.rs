//! Transfer Restriction Bridge
//!
//! A compliance-validation bridge between token-like ledgers and pluggable
//! policy-evaluation engines. The bridge receives a transfer-authorization
//! request, forwards it to the engine entry point matching the caller's
//! capability (read-only or mutating), and translates the engine's outcome
//! into a stable restriction code and human-readable message. Independent
//! validators compose under ALL/ANY semantics, and a single validator
//! instance can serve many target ledgers because the engine keys policy
//! registration to the validator's own identity.

pub mod engine;
pub mod extract;
pub mod registry;
pub mod ruleset;
pub mod types;
pub mod validator;

// Re-export key components for easier access
pub use engine::{
    failure::{classify, EngineFailure},
    PolicyEngine, RejectionBlob, ValidatorIdentity,
};
pub use extract::{extract, ExtractedParams, ParamKey, ParamValue};
pub use registry::RestrictionRegistry;
pub use ruleset::{CombinationMode, RuleSet};
pub use types::{
    error::BridgeError,
    payload::{Address, CallPayload, OP_TRANSFER, OP_TRANSFER_FROM},
    restriction::{EvaluationOutcome, RestrictionCode},
};
pub use validator::{
    adapter::TokenAdapter, rule::ComplianceRule, EvalMode, TransferValidator, WriteCapability,
};

/// Returns the version of the bridge crate
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
