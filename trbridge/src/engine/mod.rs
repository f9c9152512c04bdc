//! Policy Evaluation Engine boundary
//!
//! The engine is an external, pluggable collaborator: it executes whatever
//! policies are registered for a `(validator identity, operation)` pair and
//! signals rejection through an opaque byte blob. The bridge consumes exactly
//! two contracts:
//!
//! - [`PolicyEngine::check`]: guaranteed free of state mutation, safe to
//!   call from read-only code paths.
//! - [`PolicyEngine::run`]: may update cumulative engine state and fire
//!   post-evaluation hooks on success; its state changes are atomic and are
//!   discarded entirely on failure.
//!
//! Policy registration is keyed by the *validator's* identity, never by the
//! eventual transfer's target. This is the contract that lets one validator
//! instance serve many target ledgers with a single shared policy set.
//!
//! Raw-byte inspection of rejection blobs is confined to [`failure`];
//! [`memory`] provides the in-process reference engine.

pub mod failure;
pub mod memory;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::payload::CallPayload;

/// Stable identity of a validator, fixed at construction.
///
/// The engine keys policy lookup on this identity, so every target wired to
/// the same validator instance observes the identical policy set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ValidatorIdentity(String);

impl ValidatorIdentity {
    /// Creates a new identity from a stable name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidatorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque failure payload returned by an engine.
///
/// The bridge never interprets these bytes outside of
/// [`failure::classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionBlob(pub Vec<u8>);

impl RejectionBlob {
    /// A blob carrying no classifiable information. Classifies as
    /// [`failure::EngineFailure::Unknown`].
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Raw bytes of the blob.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Contract consumed from the external policy-evaluation engine.
pub trait PolicyEngine: Send + Sync {
    /// Evaluates registered policies without mutating any engine state.
    ///
    /// Safe from a read-only caller; this guarantee is part of the protocol,
    /// not a convention.
    fn check(&self, identity: &ValidatorIdentity, payload: &CallPayload)
        -> Result<(), RejectionBlob>;

    /// Evaluates registered policies and, on success, applies cumulative
    /// state updates and fires post-evaluation hooks.
    ///
    /// State changes are all-or-nothing: a rejection leaves the engine
    /// exactly as it was.
    fn run(&self, identity: &ValidatorIdentity, payload: &CallPayload)
        -> Result<(), RejectionBlob>;
}
