//! Storage, persisted preferences and tracing helpers for the Duo log
//! search client.

pub mod config_store;
pub mod storage;
pub mod telemetry;

pub use config_store::{PersistedConfigStore, SubscriptionId, UI_CONFIG_STORAGE_KEY, load_ui_config};
pub use storage::{InMemoryStorage, JsonFileStorage, KeyValueStorage, StorageError};
pub use telemetry::init_tracing;
