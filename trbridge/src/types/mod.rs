//! Shared type definitions for the transfer-restriction bridge.

pub mod error;
pub mod payload;
pub mod restriction;
