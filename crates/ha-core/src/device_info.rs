//! Device grouping descriptor returned by entities

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A device identifier (domain, id) pair
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceIdentifier(pub String, pub String);

impl DeviceIdentifier {
    pub fn new(domain: impl Into<String>, id: impl Into<String>) -> Self {
        Self(domain.into(), id.into())
    }

    pub fn domain(&self) -> &str {
        &self.0
    }

    pub fn id(&self) -> &str {
        &self.1
    }

    /// Create a key for indexing
    pub fn key(&self) -> String {
        format!("{}:{}", self.0, self.1)
    }
}

impl fmt::Display for DeviceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

/// Describes the device an entity belongs to
///
/// The host uses the identifiers to find or create the matching device
/// registry entry; entities reporting the same identifier share a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub identifiers: BTreeSet<DeviceIdentifier>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl DeviceInfo {
    /// Create device info with a single identifier
    pub fn new(identifier: DeviceIdentifier, name: impl Into<String>) -> Self {
        Self {
            identifiers: BTreeSet::from([identifier]),
            name: name.into(),
            manufacturer: None,
            model: None,
        }
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Check whether this device is identified by `identifier`
    pub fn has_identifier(&self, identifier: &DeviceIdentifier) -> bool {
        self.identifiers.contains(identifier)
    }
}
