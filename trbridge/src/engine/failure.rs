//! Rejection-blob classification
//!
//! This module is the single place in the bridge where raw rejection bytes
//! are inspected. A blob starts with a 4-byte selector followed by a
//! bincode-encoded body; anything shorter than a selector, carrying an
//! unrecognized selector, or with an undecodable body classifies as
//! [`EngineFailure::Unknown`]. Classification is pure and never panics.

use bincode::Options;
use tracing::debug;

use crate::{
    engine::RejectionBlob,
    types::{payload::wire_options, restriction::RestrictionCode},
};

/// Selector for a single-reason rejection, produced by the read-only path.
pub const SEL_POLICY_REJECTED: [u8; 4] = [0x52, 0x4a, 0x43, 0x01];

/// Selector for a three-field rejection carrying operation id, policy
/// reference, and reason, produced by the mutating path.
pub const SEL_POLICY_RUN_REJECTED: [u8; 4] = [0x52, 0x4a, 0x43, 0x02];

/// Structured view of an engine failure, per the bridge error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineFailure {
    /// Explicit, expected rejection from the read-only path.
    PolicyRejected {
        /// Policy-supplied explanation
        reason: String,
    },
    /// Explicit rejection from the mutating path.
    PolicyRunRejected {
        /// Operation the policy was evaluating
        operation_id: u8,
        /// Reference to the rejecting policy
        policy_ref: String,
        /// Policy-supplied explanation
        reason: String,
    },
    /// Any other failure shape, including empty or truncated blobs.
    Unknown,
}

impl EngineFailure {
    /// The restriction code this failure maps to.
    pub fn restriction_code(&self) -> RestrictionCode {
        match self {
            EngineFailure::PolicyRejected { .. } | EngineFailure::PolicyRunRejected { .. } => {
                RestrictionCode::POLICY_REJECTED
            }
            EngineFailure::Unknown => RestrictionCode::UNKNOWN_ERROR,
        }
    }

    /// The policy-supplied reason, if this failure carries one.
    pub fn reason(&self) -> Option<&str> {
        match self {
            EngineFailure::PolicyRejected { reason }
            | EngineFailure::PolicyRunRejected { reason, .. } => Some(reason.as_str()),
            EngineFailure::Unknown => None,
        }
    }
}

/// Encodes a single-reason rejection blob.
pub fn encode_rejection(reason: &str) -> RejectionBlob {
    let mut bytes = SEL_POLICY_REJECTED.to_vec();
    // Serializing a &str cannot fail; if it somehow does, the bare selector
    // has no decodable body and classifies as [`EngineFailure::Unknown`].
    if let Ok(body) = wire_options().serialize(&reason) {
        bytes.extend_from_slice(&body);
    }
    RejectionBlob(bytes)
}

/// Encodes a three-field rejection blob from the mutating path.
pub fn encode_run_rejection(operation_id: u8, policy_ref: &str, reason: &str) -> RejectionBlob {
    let mut bytes = SEL_POLICY_RUN_REJECTED.to_vec();
    if let Ok(body) = wire_options().serialize(&(operation_id, policy_ref, reason)) {
        bytes.extend_from_slice(&body);
    }
    RejectionBlob(bytes)
}

/// Classifies an opaque rejection blob into the failure taxonomy.
pub fn classify(blob: &RejectionBlob) -> EngineFailure {
    let bytes = blob.as_bytes();
    if bytes.len() < 4 {
        debug!(len = bytes.len(), "rejection blob too short for a selector");
        return EngineFailure::Unknown;
    }

    let (selector, body) = bytes.split_at(4);
    if selector == SEL_POLICY_REJECTED {
        match wire_options().deserialize::<String>(body) {
            Ok(reason) => EngineFailure::PolicyRejected { reason },
            Err(_) => EngineFailure::Unknown,
        }
    } else if selector == SEL_POLICY_RUN_REJECTED {
        match wire_options().deserialize::<(u8, String, String)>(body) {
            Ok((operation_id, policy_ref, reason)) => EngineFailure::PolicyRunRejected {
                operation_id,
                policy_ref,
                reason,
            },
            Err(_) => EngineFailure::Unknown,
        }
    } else {
        debug!(selector = %hex::encode(selector), "unrecognized rejection selector");
        EngineFailure::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_reason_rejection_classifies_with_reason() {
        let blob = encode_rejection("amount over limit");
        match classify(&blob) {
            EngineFailure::PolicyRejected { reason } => {
                assert_eq!(reason, "amount over limit");
            }
            other => panic!("expected PolicyRejected, got {other:?}"),
        }
        assert_eq!(
            classify(&blob).restriction_code(),
            RestrictionCode::POLICY_REJECTED
        );
    }

    #[test]
    fn run_rejection_carries_all_three_fields() {
        let blob = encode_run_rejection(0x02, "cumulative-cap", "cap exhausted");
        match classify(&blob) {
            EngineFailure::PolicyRunRejected {
                operation_id,
                policy_ref,
                reason,
            } => {
                assert_eq!(operation_id, 0x02);
                assert_eq!(policy_ref, "cumulative-cap");
                assert_eq!(reason, "cap exhausted");
            }
            other => panic!("expected PolicyRunRejected, got {other:?}"),
        }
    }

    #[test]
    fn short_blobs_classify_unknown() {
        for bytes in [vec![], vec![0x52], vec![0x52, 0x4a, 0x43]] {
            assert_eq!(classify(&RejectionBlob(bytes)), EngineFailure::Unknown);
        }
        assert_eq!(
            classify(&RejectionBlob::empty()).restriction_code(),
            RestrictionCode::UNKNOWN_ERROR
        );
    }

    #[test]
    fn unrecognized_selector_classifies_unknown() {
        let blob = RejectionBlob(vec![0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]);
        assert_eq!(classify(&blob), EngineFailure::Unknown);
    }

    #[test]
    fn undecodable_body_classifies_unknown() {
        // Valid selector, body claims a string longer than the bytes present.
        let mut bytes = SEL_POLICY_REJECTED.to_vec();
        bytes.extend_from_slice(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(classify(&RejectionBlob(bytes)), EngineFailure::Unknown);
    }

    #[test]
    fn bare_selector_without_body_classifies_unknown() {
        for selector in [SEL_POLICY_REJECTED, SEL_POLICY_RUN_REJECTED] {
            let blob = RejectionBlob(selector.to_vec());
            assert_eq!(classify(&blob), EngineFailure::Unknown);
        }
    }

    #[test]
    fn unknown_failure_has_no_reason() {
        assert_eq!(EngineFailure::Unknown.reason(), None);
    }
}
