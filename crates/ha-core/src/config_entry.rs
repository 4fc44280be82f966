//! Config Entry types
//!
//! A ConfigEntry represents a single configured instance of an integration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Config entry lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConfigEntryState {
    /// Initial state, not yet set up
    #[default]
    NotLoaded,
    /// Currently being set up
    SetupInProgress,
    /// Successfully set up
    Loaded,
    /// Setup failed
    SetupError,
}

/// A configuration entry for an integration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Unique identifier (ULID)
    pub entry_id: String,

    /// Integration domain (e.g., "iotopen")
    pub domain: String,

    /// Human-readable display name
    pub title: String,

    /// Immutable configuration data
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,

    /// User-configurable options
    #[serde(default)]
    pub options: HashMap<String, serde_json::Value>,

    /// Current lifecycle state (not persisted)
    #[serde(skip, default)]
    pub state: ConfigEntryState,

    /// Human-readable explanation for failed states
    #[serde(skip, default)]
    pub reason: Option<String>,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl ConfigEntry {
    /// Create a new config entry
    pub fn new(domain: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            entry_id: ulid::Ulid::new().to_string(),
            domain: domain.into(),
            title: title.into(),
            data: HashMap::new(),
            options: HashMap::new(),
            state: ConfigEntryState::NotLoaded,
            reason: None,
            created_at: Utc::now(),
        }
    }

    /// Set entry data
    pub fn with_data(mut self, data: HashMap<String, serde_json::Value>) -> Self {
        self.data = data;
        self
    }

    /// Set entry options
    pub fn with_options(mut self, options: HashMap<String, serde_json::Value>) -> Self {
        self.options = options;
        self
    }

    /// Check if entry is loaded
    pub fn is_loaded(&self) -> bool {
        self.state == ConfigEntryState::Loaded
    }

    /// Mark the entry as being set up
    pub fn set_setup_in_progress(&mut self) {
        self.state = ConfigEntryState::SetupInProgress;
        self.reason = None;
    }

    /// Mark the entry as loaded, clearing any previous failure reason
    pub fn set_loaded(&mut self) {
        self.state = ConfigEntryState::Loaded;
        self.reason = None;
    }

    /// Mark setup as failed with a reason
    pub fn set_setup_error(&mut self, reason: impl Into<String>) {
        self.state = ConfigEntryState::SetupError;
        self.reason = Some(reason.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_entry_is_not_loaded() {
        let entry = ConfigEntry::new("iotopen", "Lynx");
        assert_eq!(entry.state, ConfigEntryState::NotLoaded);
        assert_eq!(entry.entry_id.len(), 26);
        assert!(!entry.is_loaded());
    }

    #[test]
    fn test_state_transitions() {
        let mut entry = ConfigEntry::new("iotopen", "Lynx");
        entry.set_setup_in_progress();
        assert_eq!(entry.state, ConfigEntryState::SetupInProgress);
        assert!(!entry.is_loaded());

        entry.set_setup_error("coordinator missing");
        assert_eq!(entry.state, ConfigEntryState::SetupError);
        assert_eq!(entry.reason.as_deref(), Some("coordinator missing"));

        entry.set_loaded();
        assert!(entry.is_loaded());
        assert!(entry.reason.is_none());
    }

    #[test]
    fn test_deserialize_skips_runtime_state() {
        let entry: ConfigEntry = serde_json::from_value(json!({
            "entry_id": "01JABCDEF",
            "domain": "iotopen",
            "title": "Home",
            "data": {"installation_id": 3}
        }))
        .unwrap();
        assert_eq!(entry.entry_id, "01JABCDEF");
        assert_eq!(entry.data["installation_id"], json!(3));
        assert_eq!(entry.state, ConfigEntryState::NotLoaded);
    }
}
