//! Error types for bridge operations
//!
//! Errors in this module are fatal from the caller's perspective: an
//! unsupported operation or an undecodable payload is a programming or wiring
//! mistake, surfaced immediately and never retried. Policy rejections are
//! not errors: they are expected outcomes, carried by
//! [`EngineFailure`](crate::engine::failure::EngineFailure) and mapped to
//! restriction codes.

use std::error::Error;

use thiserror::Error as ThisError;

/// Unified error type for the bridge core.
#[derive(Debug, ThisError)]
pub enum BridgeError {
    /// The extractor was handed a payload whose operation discriminator it
    /// does not recognize.
    #[error("unsupported operation id {operation_id:#04x}")]
    UnsupportedOperation {
        /// The unrecognized discriminator
        operation_id: u8,
    },

    /// The payload's raw data could not be decoded for the matched operation
    /// shape. Decoding never substitutes defaults on malformed input.
    #[error("malformed payload: {context}")]
    MalformedPayload {
        /// Description of the decode failure
        context: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },

    /// A privileged operation was invoked by a caller without the required
    /// administrator capability.
    #[error("unauthorized: {context}")]
    Unauthorized {
        /// Description of the rejected operation
        context: String,
    },

    /// Internal implementation error (serialization of well-formed data
    /// failing, and similar conditions that indicate a bug).
    #[error("internal error: {context}")]
    Internal {
        /// Description of the internal error
        context: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },
}

impl BridgeError {
    /// Creates a new malformed-payload error
    pub fn malformed_payload<E>(context: impl Into<String>, source: Option<E>) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        BridgeError::MalformedPayload {
            context: context.into(),
            source: source.map(|e| Box::new(e) as Box<dyn Error + Send + Sync>),
        }
    }

    /// Creates a new unauthorized error
    pub fn unauthorized(context: impl Into<String>) -> Self {
        BridgeError::Unauthorized {
            context: context.into(),
        }
    }

    /// Creates a new internal error
    pub fn internal<E>(context: impl Into<String>, source: Option<E>) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        BridgeError::Internal {
            context: context.into(),
            source: source.map(|e| Box::new(e) as Box<dyn Error + Send + Sync>),
        }
    }
}
