//! Save/load persistence
//!
//! Features:
//! - Key/value `Storage` seam (file on native, LocalStorage on web, memory in tests)
//! - Versioned JSON envelope
//! - Corruption detection (callers fall back to defaults and overwrite)

pub mod envelope;
pub mod storage;

pub use envelope::{ENVELOPE_VERSION, Envelope, EnvelopeError, open, seal};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
