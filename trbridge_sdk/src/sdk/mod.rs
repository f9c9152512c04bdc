//! # Bridge SDK Module
//!
//! Organizes the host-ledger integration surface:
//!
//! * `ledger_sdk`: balance and allowance bookkeeping with every executing
//!   transfer routed through the bridge's mutating entry point

pub mod ledger_sdk;

// Re-export primary SDK components for easier access
pub use ledger_sdk::LedgerSDK;
