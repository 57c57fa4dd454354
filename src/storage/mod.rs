//! Durable key-value storage for client state.
//!
//! The stores mirror their in-memory state into a flat string-keyed blob
//! store: `FileKv` persists one file per key under a per-user data
//! directory, `MemoryKv` keeps everything in process memory for tests and
//! deployments that should not survive a restart.
//!
//! There is no transactional guarantee across keys; the session store
//! re-validates against the server on startup, so a partial write is
//! recovered there.

pub mod file;
pub mod memory;

pub use file::FileKv;
pub use memory::MemoryKv;

use anyhow::Result;

/// Flat key-value blob store consumed by the session and cart stores.
///
/// Implementations are synchronous. Callers treat failures as advisory:
/// they log and continue rather than surfacing storage errors to the UI.
pub trait KvStore: Send + Sync {
    /// Fetch the value for `key`, `None` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
