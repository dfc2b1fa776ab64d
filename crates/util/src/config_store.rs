//! Persisted search UI configuration.
//!
//! [`PersistedConfigStore`] is an observable value cell seeded from
//! durable storage when it is created and written back to storage on every
//! change. Observers receive the current value on subscription and then
//! every later value, in the order updates were applied.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use duo_search_types::UiConfig;
use serde_json::Value;
use tracing::{debug, warn};

use crate::storage::KeyValueStorage;

/// Storage key holding the serialized search UI configuration.
pub const UI_CONFIG_STORAGE_KEY: &str = "config-log-search-ui";

type Observer = Arc<dyn Fn(&UiConfig) + Send + Sync>;

/// Handle returned by [`PersistedConfigStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct StoreState {
    value: UiConfig,
    observers: Vec<(SubscriptionId, Observer)>,
    next_id: u64,
    // Values waiting to be delivered, oldest first.
    pending: VecDeque<UiConfig>,
    notifying: bool,
}

/// Observable UI configuration mirrored to a [`KeyValueStorage`].
///
/// Storage writes are best-effort: failures are logged and never reach
/// the caller, so the durable copy may lag the in-memory value if the
/// backend is unavailable.
pub struct PersistedConfigStore<S: KeyValueStorage> {
    storage: S,
    key: String,
    state: Mutex<StoreState>,
}

impl<S: KeyValueStorage> PersistedConfigStore<S> {
    /// Load the configuration stored under [`UI_CONFIG_STORAGE_KEY`].
    pub fn initialize(storage: S) -> Self {
        Self::with_key(storage, UI_CONFIG_STORAGE_KEY)
    }

    /// Load the configuration stored under `key`.
    ///
    /// The loaded value is written straight back, so unreadable content is
    /// replaced by `{}`.
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let value = load_ui_config(&storage, &key);
        persist(&storage, &key, &value);
        Self {
            storage,
            key,
            state: Mutex::new(StoreState {
                value,
                observers: Vec::new(),
                next_id: 0,
                pending: VecDeque::new(),
                notifying: false,
            }),
        }
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> UiConfig {
        self.state.lock().expect("config store lock poisoned").value.clone()
    }

    /// Replace the whole value, persist it and notify observers.
    ///
    /// A `set` issued while observers are being notified (from inside an
    /// observer, or from another thread) is queued: every observer sees
    /// each value exactly in the order the updates were applied.
    pub fn set(&self, value: UiConfig) {
        {
            let mut state = self.state.lock().expect("config store lock poisoned");
            state.value = value;
            persist(&self.storage, &self.key, &state.value);
            let queued = state.value.clone();
            state.pending.push_back(queued);
            if state.notifying {
                return;
            }
            state.notifying = true;
        }

        loop {
            let (next, observers) = {
                let mut state = self.state.lock().expect("config store lock poisoned");
                let Some(next) = state.pending.pop_front() else {
                    state.notifying = false;
                    return;
                };
                let observers: Vec<Observer> = state.observers.iter().map(|(_, observer)| Arc::clone(observer)).collect();
                (next, observers)
            };
            for observer in observers {
                observer(&next);
            }
        }
    }

    /// Modify the current value in place, then behave like [`set`](Self::set).
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut UiConfig),
    {
        let mut value = self.get();
        f(&mut value);
        self.set(value);
    }

    /// Register `observer`; it is called immediately with the current value.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&UiConfig) + Send + Sync + 'static,
    {
        let observer: Observer = Arc::new(observer);
        let (id, current) = {
            let mut state = self.state.lock().expect("config store lock poisoned");
            let id = SubscriptionId(state.next_id);
            state.next_id += 1;
            state.observers.push((id, Arc::clone(&observer)));
            (id, state.value.clone())
        };
        observer(&current);
        id
    }

    /// Stop notifying the observer registered as `id`.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.state.lock().expect("config store lock poisoned");
        let before = state.observers.len();
        state.observers.retain(|(existing, _)| *existing != id);
        before != state.observers.len()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Read the configuration stored under `key`.
///
/// Missing, empty, malformed or non-object content yields an empty map.
pub fn load_ui_config<S: KeyValueStorage + ?Sized>(storage: &S, key: &str) -> UiConfig {
    let raw = match storage.get(key) {
        Ok(Some(raw)) if !raw.trim().is_empty() => raw,
        Ok(_) => return UiConfig::new(),
        Err(error) => {
            warn!(%key, error = %error, "Failed to read UI config; using defaults");
            return UiConfig::new();
        }
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(config)) => config,
        Ok(other) => {
            warn!(%key, kind = json_kind(&other), "UI config is not an object; using defaults");
            UiConfig::new()
        }
        Err(error) => {
            warn!(%key, error = %error, "Failed to parse UI config; using defaults");
            UiConfig::new()
        }
    }
}

fn persist<S: KeyValueStorage + ?Sized>(storage: &S, key: &str, value: &UiConfig) {
    let serialized = match serde_json::to_string(value) {
        Ok(serialized) => serialized,
        Err(error) => {
            warn!(%key, error = %error, "Failed to serialize UI config");
            return;
        }
    };
    match storage.set(key, &serialized) {
        Ok(()) => debug!(%key, bytes = serialized.len(), "UI config persisted"),
        Err(error) => warn!(%key, error = %error, "Failed to persist UI config"),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
