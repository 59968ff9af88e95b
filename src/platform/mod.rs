//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time
//! - Input devices
//! - Key-value storage (LocalStorage on web, a JSON file natively)

pub mod input;
pub mod storage;

pub use input::{ControlSurface, FireButton, InputSource, Key, Keyboard, NoInput, VirtualJoystick};
pub use storage::{KeyValueStore, MemoryStore, StorageError};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStore;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
