//! Vault module — encrypted entry storage.
//!
//! This module provides:
//! - Typed entry values and the versioned entries document (`entry`)
//! - Binary vault file format (`format`)
//! - High-level `VaultStore` for creating, opening, and managing vaults (`store`)

pub mod entry;
pub mod format;
pub mod store;

// Re-export the most commonly used items.
pub use entry::{EntriesDocument, EntryKind, EntryValue};
pub use format::VaultHeader;
pub use store::{EntryMetadata, VaultStore};
