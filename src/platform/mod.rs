//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Logging setup
//! - Default storage backend (data directory on native, LocalStorage on web)

#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

/// Environment variable overriding the native data directory
#[cfg(not(target_arch = "wasm32"))]
pub const DATA_DIR_ENV: &str = "AR_WASTE_PATROL_DATA";

/// Storage backend used by the running platform
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStorage = crate::persistence::FileStorage;

#[cfg(target_arch = "wasm32")]
pub type PlatformStorage = crate::persistence::LocalStorage;

/// Initialise logging for this platform
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    // Already initialised is fine (tests, embedding hosts)
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Directory holding persisted player data on native builds
#[cfg(not(target_arch = "wasm32"))]
pub fn data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".ar-waste-patrol"))
}

/// Storage backend for this platform
#[cfg(not(target_arch = "wasm32"))]
pub fn default_storage() -> PlatformStorage {
    crate::persistence::FileStorage::new(data_dir())
}

#[cfg(target_arch = "wasm32")]
pub fn default_storage() -> PlatformStorage {
    crate::persistence::LocalStorage::new("ar_waste_patrol")
}
