//! Shared data model for the Duo log search client.
//!
//! These are transport-level shapes: the client never interprets log
//! content beyond generic field/value pairs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod deser;
pub mod schema;
pub mod search;

pub use schema::Schema;
pub use search::{LogQuery, SearchParams};

/// Identifier of an upstream service producing log entries.
pub type ServiceName = String;

/// A single log entry. Its shape is owned by the backend.
pub type LogRecord = Value;

/// Free-form, JSON-serializable search UI preferences.
pub type UiConfig = Map<String, Value>;

/// Aggregated occurrence count of one value of a log field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStat {
    pub count: u64,
    #[serde(deserialize_with = "deser::lenient_string")]
    pub value: String,
}

impl FieldStat {
    pub fn new(value: impl Into<String>, count: u64) -> Self {
        Self {
            count,
            value: value.into(),
        }
    }
}

/// Envelope of the service catalogue response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicesEnvelope {
    #[serde(default, deserialize_with = "deser::null_as_empty")]
    pub data: Vec<ServiceName>,
}

impl ServicesEnvelope {
    /// Service names sorted ascending, independent of backend ordering.
    pub fn into_sorted(self) -> Vec<ServiceName> {
        let mut services = self.data;
        services.sort();
        services
    }
}
