//! Call payloads and the raw-data wire codec
//!
//! A [`CallPayload`] is the unit of work handed to a policy-evaluation
//! engine: a small operation discriminator, the caller's identity, and an
//! opaque byte body whose shape is determined by the discriminator. Payloads
//! are constructed fresh per evaluation and never reused.
//!
//! The codec is fixed-width bincode with trailing bytes rejected, so a
//! payload either decodes exactly or fails loudly.

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::types::error::BridgeError;

/// Account / contract identity on the host ledger.
pub type Address = String;

/// Two-field transfer: `from` is implied by the payload's caller,
/// `(to, amount)` are carried in the raw data.
pub const OP_TRANSFER: u8 = 0x01;

/// Three-field transfer/validate: `(from, to, amount)` are all carried in
/// the raw data.
pub const OP_TRANSFER_FROM: u8 = 0x02;

/// One evaluation request as presented to a policy engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallPayload {
    /// Operation shape discriminator (`OP_TRANSFER`, `OP_TRANSFER_FROM`)
    pub operation_id: u8,
    /// Identity on whose behalf the call is made
    pub caller: Address,
    /// Operation parameters, encoded per the matched shape
    pub raw_data: Vec<u8>,
    /// Free-form context bytes, empty unless the host supplies them
    pub context: Vec<u8>,
}

impl CallPayload {
    /// Builds a payload for the given operation with empty context.
    pub fn new(operation_id: u8, caller: impl Into<Address>, raw_data: Vec<u8>) -> Self {
        Self {
            operation_id,
            caller: caller.into(),
            raw_data,
            context: Vec::new(),
        }
    }
}

/// Wire codec shared by all raw-data encoders and the extractor.
pub(crate) fn wire_options() -> impl Options {
    bincode::DefaultOptions::new().with_fixint_encoding()
}

/// Encodes the two-field transfer body `(to, amount)`.
pub fn encode_transfer(to: &str, amount: u64) -> Result<Vec<u8>, BridgeError> {
    wire_options()
        .serialize(&(to, amount))
        .map_err(|e| BridgeError::internal("failed to encode transfer body", Some(e)))
}

/// Encodes the three-field transfer body `(from, to, amount)`.
pub fn encode_transfer_from(from: &str, to: &str, amount: u64) -> Result<Vec<u8>, BridgeError> {
    wire_options()
        .serialize(&(from, to, amount))
        .map_err(|e| BridgeError::internal("failed to encode transfer body", Some(e)))
}
