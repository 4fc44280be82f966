//! Function state snapshots published by the IoT Open coordinator
//!
//! The coordinator owns the mapping from `function_id` to the latest
//! [`FunctionState`]. Updates replace the whole snapshot at once, so a reader
//! holding an `Arc<FunctionMap>` never sees a partially applied refresh.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Snapshot of all functions keyed by `function_id`, in insertion order
pub type FunctionMap = IndexMap<i64, FunctionState>;

/// Keywords in a function type that mark it as binary (on/off style)
const BINARY_TYPE_KEYWORDS: &[&str] = &[
    "switch",
    "door",
    "window",
    "motion",
    "alarm",
    "leak",
    "smoke",
    "occupancy",
    "presence",
    "binary",
    "contact",
];

/// Free-form metadata attached to a function
///
/// Lookups treat null, `false`, zero, and empty strings or collections as
/// missing, so a blank `unit` falls through to `unit_of_measurement`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionMeta(HashMap<String, serde_json::Value>);

impl FunctionMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// First non-empty value among `keys`, rendered as text
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find(|value| is_truthy(value))
            .map(|value| match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
    }

    /// Unit from `unit`, falling back to `unit_of_measurement`, trimmed
    ///
    /// Returns an empty string when neither key carries a value.
    pub fn unit(&self) -> String {
        self.first_text(&["unit", "unit_of_measurement"])
            .map(|unit| unit.trim().to_string())
            .unwrap_or_default()
    }
}

fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(a) => !a.is_empty(),
        serde_json::Value::Object(o) => !o.is_empty(),
    }
}

/// Latest known state of one IoT Open function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionState {
    pub function_id: i64,
    pub installation_id: i64,
    #[serde(default)]
    pub device_id: Option<i64>,
    pub name: String,
    #[serde(rename = "type")]
    pub function_type: String,
    #[serde(default)]
    pub meta: Option<FunctionMeta>,
    #[serde(default)]
    pub last_value: serde_json::Value,
    /// Unix seconds on the wire
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub last_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub topic_read: String,
}

impl FunctionState {
    pub fn new(
        function_id: i64,
        installation_id: i64,
        name: impl Into<String>,
        function_type: impl Into<String>,
    ) -> Self {
        Self {
            function_id,
            installation_id,
            device_id: None,
            name: name.into(),
            function_type: function_type.into(),
            meta: None,
            last_value: serde_json::Value::Null,
            last_timestamp: None,
            topic_read: String::new(),
        }
    }

    pub fn with_device_id(mut self, device_id: i64) -> Self {
        self.device_id = Some(device_id);
        self
    }

    pub fn with_meta(mut self, meta: FunctionMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_value(mut self, value: impl Into<serde_json::Value>, at: DateTime<Utc>) -> Self {
        self.last_value = value.into();
        self.last_timestamp = Some(at);
        self
    }

    pub fn with_topic_read(mut self, topic: impl Into<String>) -> Self {
        self.topic_read = topic.into();
        self
    }
}

/// Whether a function is handled by the binary sensor platform
///
/// A function is binary when its last value is a boolean or its type names
/// an on/off kind of input.
pub fn is_binary_function(state: &FunctionState) -> bool {
    if state.last_value.is_boolean() {
        return true;
    }
    let function_type = state.function_type.to_lowercase();
    BINARY_TYPE_KEYWORDS
        .iter()
        .any(|keyword| function_type.contains(keyword))
}

/// Build a snapshot from states, keyed by `function_id`
///
/// A repeated id replaces the earlier state in place.
pub fn function_map<I>(states: I) -> FunctionMap
where
    I: IntoIterator<Item = FunctionState>,
{
    let mut map = FunctionMap::new();
    for state in states {
        let function_id = state.function_id;
        if map.insert(function_id, state).is_some() {
            warn!(function_id, "Duplicate function id in update, keeping the latest");
        }
    }
    map
}

/// Holds the latest function snapshot for one config entry
pub struct IoTOpenCoordinator {
    name: String,
    data: RwLock<Arc<FunctionMap>>,
    last_update_success: AtomicBool,
    last_error: RwLock<Option<String>>,
}

impl IoTOpenCoordinator {
    /// Create a coordinator with an empty snapshot
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: RwLock::new(Arc::new(FunctionMap::new())),
            last_update_success: AtomicBool::new(true),
            last_error: RwLock::new(None),
        }
    }

    /// Create a coordinator seeded with `states`
    pub fn with_states<I>(name: impl Into<String>, states: I) -> Self
    where
        I: IntoIterator<Item = FunctionState>,
    {
        let coordinator = Self::new(name);
        coordinator.set_updated_data(function_map(states));
        coordinator
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current snapshot
    pub fn data(&self) -> Arc<FunctionMap> {
        match self.data.read() {
            Ok(data) => data.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Current state of one function
    pub fn get(&self, function_id: i64) -> Option<FunctionState> {
        self.data().get(&function_id).cloned()
    }

    pub fn contains(&self, function_id: i64) -> bool {
        self.data().contains_key(&function_id)
    }

    pub fn len(&self) -> usize {
        self.data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }

    /// Publish a new snapshot, replacing the previous one
    pub fn set_updated_data(&self, data: FunctionMap) {
        let count = data.len();
        let data = Arc::new(data);
        match self.data.write() {
            Ok(mut current) => *current = data,
            Err(poisoned) => *poisoned.into_inner() = data,
        }
        self.last_update_success.store(true, Ordering::SeqCst);
        self.store_last_error(None);
        debug!(coordinator = %self.name, functions = count, "Published function snapshot");
    }

    /// Record a failed refresh; the current snapshot is kept
    pub fn set_update_error(&self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(coordinator = %self.name, reason = %reason, "Function refresh failed");
        self.last_update_success.store(false, Ordering::SeqCst);
        self.store_last_error(Some(reason));
    }

    fn store_last_error(&self, error: Option<String>) {
        match self.last_error.write() {
            Ok(mut last_error) => *last_error = error,
            Err(poisoned) => *poisoned.into_inner() = error,
        }
    }

    pub fn last_update_success(&self) -> bool {
        self.last_update_success.load(Ordering::SeqCst)
    }

    pub fn last_error(&self) -> Option<String> {
        match self.last_error.read() {
            Ok(last_error) => last_error.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl std::fmt::Debug for IoTOpenCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoTOpenCoordinator")
            .field("name", &self.name)
            .field("functions", &self.len())
            .field("last_update_success", &self.last_update_success())
            .finish()
    }
}
