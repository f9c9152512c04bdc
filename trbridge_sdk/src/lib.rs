//! # Transfer Restriction Bridge SDK
//!
//! This library provides a high-level interface for wiring a host token
//! ledger to the transfer-restriction bridge. The SDK holds the ledger's
//! balances and allowances, and routes every executing transfer through the
//! bridge's mutating entry point so that compliance state and ledger state
//! commit together or not at all.
//!
//! ## Key Components
//!
//! * **Ledger SDK**: Balance, allowance, and mint/burn bookkeeping with
//!   bridge-enforced transfers
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use trbridge::{
//!     engine::memory::MemoryPolicyEngine, RestrictionRegistry, TokenAdapter,
//!     ValidatorIdentity,
//! };
//! use trbridge_sdk::ledger_sdk::LedgerSDK;
//!
//! let engine = Arc::new(MemoryPolicyEngine::new());
//! let registry = Arc::new(RestrictionRegistry::new("admin"));
//! let (adapter, cap) = TokenAdapter::bind(
//!     "TKN",
//!     ValidatorIdentity::new("adapter-tkn"),
//!     engine,
//!     registry,
//! );
//!
//! let ledger = LedgerSDK::new("TKN", adapter, cap);
//! ledger.mint("alice", 1_000).unwrap();
//! ledger.transfer("alice", "bob", 250).unwrap();
//! assert_eq!(ledger.balance_of("bob").value(), 250);
//! ```

// Re-export all SDK modules for external consumption
pub mod sdk;

// Re-export commonly used components for convenience
pub use sdk::ledger_sdk;
pub use sdk::ledger_sdk::{Balance, LedgerError, LedgerSDK, TransferRecord};

/// Current version of the bridge SDK
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
