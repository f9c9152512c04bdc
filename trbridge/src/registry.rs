//! Restriction-message registry
//!
//! Keyed store of restriction code → human-readable message. The registry is
//! constructed once with protocol defaults and lives for the system's
//! lifetime; only its owner may overwrite entries. Components that need
//! messages receive the registry by reference, there is no ambient global.

use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;
use tracing::debug;

use crate::types::{
    error::BridgeError,
    payload::Address,
    restriction::RestrictionCode,
};

/// Fallback text for codes with no stored message.
pub const UNKNOWN_RESTRICTION_MESSAGE: &str = "Unknown restriction code";

/// Default message for code 0.
pub const DEFAULT_OK_MESSAGE: &str = "No restriction";

/// Default message for code 1.
pub const DEFAULT_REJECTED_MESSAGE: &str = "Transfer rejected by compliance policy";

/// Default message for code 255.
pub const DEFAULT_UNKNOWN_MESSAGE: &str = "Unknown compliance error occurred";

/// Owner-gated store of restriction messages.
#[derive(Debug, Clone)]
pub struct RestrictionRegistry {
    owner: Address,
    messages: Arc<RwLock<HashMap<RestrictionCode, String>>>,
}

impl RestrictionRegistry {
    /// Creates a registry seeded with the protocol defaults, owned by the
    /// given administrator identity.
    pub fn new(owner: impl Into<Address>) -> Self {
        let mut messages = HashMap::new();
        messages.insert(RestrictionCode::OK, DEFAULT_OK_MESSAGE.to_string());
        messages.insert(
            RestrictionCode::POLICY_REJECTED,
            DEFAULT_REJECTED_MESSAGE.to_string(),
        );
        messages.insert(
            RestrictionCode::UNKNOWN_ERROR,
            DEFAULT_UNKNOWN_MESSAGE.to_string(),
        );
        Self {
            owner: owner.into(),
            messages: Arc::new(RwLock::new(messages)),
        }
    }

    /// The administrator identity allowed to overwrite messages.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Stores a message for a code, overwriting any previous text.
    ///
    /// Fails with [`BridgeError::Unauthorized`] unless `caller` is the
    /// registry owner.
    pub fn set_message(
        &self,
        caller: &str,
        code: RestrictionCode,
        message: impl Into<String>,
    ) -> Result<(), BridgeError> {
        if caller != self.owner {
            return Err(BridgeError::unauthorized(format!(
                "caller {caller} may not set restriction messages"
            )));
        }
        let message = message.into();
        debug!(%code, %message, "restriction message updated");
        self.messages.write().insert(code, message);
        Ok(())
    }

    /// Returns the stored message for a code, or the fixed fallback text if
    /// none is set.
    pub fn message_for(&self, code: RestrictionCode) -> String {
        self.messages
            .read()
            .get(&code)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_RESTRICTION_MESSAGE.to_string())
    }
}
