//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time/ticks
//! - Input events
//! - Storage (LocalStorage on web, files or memory elsewhere)

pub mod input;
pub mod storage;
pub mod time;

pub use input::{Action, InputLayer, KeyMap, RawInput, TouchButtons, TouchEvent};
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorageStore;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use time::{FIXED_DT, FixedStep};
