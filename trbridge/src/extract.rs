//! Payload extractor
//!
//! Stateless, pure decoder from a [`CallPayload`] to named transfer
//! parameters. The extractor recognizes the two wire shapes of the bridge
//! protocol and nothing else; an unknown discriminator or a body that does
//! not decode exactly is an error, never a defaulted value.

use bincode::Options;

use crate::types::{
    error::BridgeError,
    payload::{wire_options, Address, CallPayload, OP_TRANSFER, OP_TRANSFER_FROM},
};

/// Semantic key of one extracted parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKey {
    /// Sending account
    From,
    /// Receiving account
    To,
    /// Transfer amount
    Amount,
}

/// Value of one extracted parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Ledger identity
    Address(Address),
    /// Token amount
    Amount(u64),
}

/// Parameters decoded from a payload, exposed as ordered `(key, value)`
/// pairs.
///
/// Order is fixed as `from`, `to`, `amount` for every supported shape, so
/// identical payloads always extract to identical parameter lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedParams {
    from: Address,
    to: Address,
    amount: u64,
}

impl ExtractedParams {
    fn new(from: Address, to: Address, amount: u64) -> Self {
        Self { from, to, amount }
    }

    /// The parameters in their fixed semantic order.
    pub fn pairs(&self) -> Vec<(ParamKey, ParamValue)> {
        vec![
            (ParamKey::From, ParamValue::Address(self.from.clone())),
            (ParamKey::To, ParamValue::Address(self.to.clone())),
            (ParamKey::Amount, ParamValue::Amount(self.amount)),
        ]
    }

    /// Sending account.
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Receiving account.
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Transfer amount.
    pub fn amount(&self) -> u64 {
        self.amount
    }
}

/// Decodes a payload into named parameters.
///
/// Fails with [`BridgeError::UnsupportedOperation`] for an unrecognized
/// discriminator and [`BridgeError::MalformedPayload`] when the raw data
/// does not decode exactly for the matched shape.
pub fn extract(payload: &CallPayload) -> Result<ExtractedParams, BridgeError> {
    match payload.operation_id {
        OP_TRANSFER => {
            let (to, amount): (Address, u64) =
                wire_options().deserialize(&payload.raw_data).map_err(|e| {
                    BridgeError::malformed_payload(
                        format!("transfer body of {} bytes", payload.raw_data.len()),
                        Some(e),
                    )
                })?;
            Ok(ExtractedParams::new(payload.caller.clone(), to, amount))
        }
        OP_TRANSFER_FROM => {
            let (from, to, amount): (Address, Address, u64) =
                wire_options().deserialize(&payload.raw_data).map_err(|e| {
                    BridgeError::malformed_payload(
                        format!("transfer-from body of {} bytes", payload.raw_data.len()),
                        Some(e),
                    )
                })?;
            Ok(ExtractedParams::new(from, to, amount))
        }
        other => Err(BridgeError::UnsupportedOperation {
            operation_id: other,
        }),
    }
}
