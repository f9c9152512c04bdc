//! Restriction codes and evaluation outcomes
//!
//! A restriction code is the stable, versioned classification of why a
//! transfer was disallowed. Code 0 always means the transfer is allowed and
//! is never reassigned; 1 and 255 are reserved by the protocol, the rest of
//! the range is administrator-defined.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable small-integer classification of a transfer-restriction decision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RestrictionCode(pub u8);

impl RestrictionCode {
    /// Transfer allowed, no restriction.
    pub const OK: RestrictionCode = RestrictionCode(0);

    /// Transfer explicitly rejected by a compliance policy.
    pub const POLICY_REJECTED: RestrictionCode = RestrictionCode(1);

    /// Engine failure that could not be classified.
    pub const UNKNOWN_ERROR: RestrictionCode = RestrictionCode(255);

    /// True iff this code means the transfer is allowed.
    pub fn is_ok(&self) -> bool {
        self.0 == 0
    }

    /// The raw code value.
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for RestrictionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for RestrictionCode {
    fn from(code: u8) -> Self {
        RestrictionCode(code)
    }
}

/// Result of one validator evaluation.
///
/// The invariant `allowed == code.is_ok()` holds for any outcome built
/// through the constructors below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationOutcome {
    /// Whether the transfer may proceed
    pub allowed: bool,
    /// Restriction classification
    pub code: RestrictionCode,
    /// Human-readable explanation
    pub message: String,
}

impl EvaluationOutcome {
    /// Outcome for an admitted transfer.
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            code: RestrictionCode::OK,
            message: String::new(),
        }
    }

    /// Outcome for a disallowed transfer.
    pub fn rejected(code: RestrictionCode, message: impl Into<String>) -> Self {
        debug_assert!(!code.is_ok(), "rejection outcome requires a non-zero code");
        Self {
            allowed: false,
            code,
            message: message.into(),
        }
    }
}
