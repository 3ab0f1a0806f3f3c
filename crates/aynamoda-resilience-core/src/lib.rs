//! Shared infrastructure for the AYNAMODA resilience layer.
//!
//! This crate provides what every resilience component leans on:
//! - [`KeyValueStore`] and its in-memory, file-backed, and fault-injecting
//!   implementations
//! - An injectable [`Clock`]
//! - The persisted, capped [`ErrorLog`]
//! - The event system used for observability
//! - Storage key conventions in [`keys`]
//! - The wardrobe and weather values in [`model`]

pub mod chaos;
pub mod clock;
pub mod context;
pub mod error;
pub mod error_log;
pub mod events;
pub mod keys;
pub mod model;
pub mod storage;

pub use chaos::{ChaosStore, FaultScope};
pub use clock::{Clock, ManualClock, SystemClock};
pub use context::OperationContext;
pub use error::StorageError;
pub use error_log::{ErrorLog, ErrorLogEntry, Severity, CRITICAL_MARKER, DEFAULT_ERROR_LOG_CAPACITY};
pub use events::{EventListener, EventListeners, FnListener, ResilienceEvent};
pub use model::{
    DailyRecommendations, ItemCategory, OutfitRecommendation, WardrobeItem, WeatherCondition,
    WeatherContext,
};
pub use storage::{load_json, store_json, JsonFileStore, KeyValueStore, MemoryStore};
