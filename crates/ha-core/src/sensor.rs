//! Sensor entity surface
//!
//! Device and state classes plus the conversion of a [`SensorEntity`] into
//! the state string and attributes the host stores.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::trace;

use crate::attrs::{
    ATTR_DEVICE_CLASS, ATTR_FRIENDLY_NAME, ATTR_STATE_CLASS, ATTR_UNIT_OF_MEASUREMENT,
};
use crate::{Attributes, Entity, STATE_UNAVAILABLE, STATE_UNKNOWN};

/// Error returned when parsing an unrecognised class name
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownClassError {
    kind: &'static str,
    value: String,
}

/// Physical quantity a sensor measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorDeviceClass {
    /// Energy in Wh or kWh
    Energy,
    /// Relative humidity in %
    Humidity,
    /// Power in W or kW
    Power,
    /// Temperature in °C or °F
    Temperature,
}

impl SensorDeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorDeviceClass::Energy => "energy",
            SensorDeviceClass::Humidity => "humidity",
            SensorDeviceClass::Power => "power",
            SensorDeviceClass::Temperature => "temperature",
        }
    }
}

impl fmt::Display for SensorDeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorDeviceClass {
    type Err = UnknownClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "energy" => Ok(SensorDeviceClass::Energy),
            "humidity" => Ok(SensorDeviceClass::Humidity),
            "power" => Ok(SensorDeviceClass::Power),
            "temperature" => Ok(SensorDeviceClass::Temperature),
            _ => Err(UnknownClassError {
                kind: "device class",
                value: s.to_string(),
            }),
        }
    }
}

/// How the host should aggregate a sensor's values for statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorStateClass {
    /// Instantaneous reading in present time
    Measurement,
    /// Monotonically increasing total, e.g. lifetime energy consumption
    TotalIncreasing,
}

impl SensorStateClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorStateClass::Measurement => "measurement",
            SensorStateClass::TotalIncreasing => "total_increasing",
        }
    }
}

impl fmt::Display for SensorStateClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorStateClass {
    type Err = UnknownClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "measurement" => Ok(SensorStateClass::Measurement),
            "total_increasing" => Ok(SensorStateClass::TotalIncreasing),
            _ => Err(UnknownClassError {
                kind: "state class",
                value: s.to_string(),
            }),
        }
    }
}

/// An entity reporting a measured value
pub trait SensorEntity: Entity {
    /// The raw value as reported by the integration, `None` when unknown
    fn native_value(&self) -> Option<serde_json::Value>;

    fn device_class(&self) -> Option<SensorDeviceClass> {
        None
    }

    fn native_unit_of_measurement(&self) -> Option<&str> {
        None
    }

    fn state_class(&self) -> Option<SensorStateClass> {
        None
    }
}

/// The state string and attributes the host writes for a sensor
#[derive(Debug, Clone, PartialEq)]
pub struct SensorStateSnapshot {
    pub state: String,
    pub attributes: Attributes,
}

/// Display name written as `friendly_name`
///
/// Entities with `has_entity_name` are prefixed by their device name; without
/// an entity name they take the device name alone.
fn friendly_name(entity: &dyn SensorEntity) -> Option<String> {
    let name = entity.name();
    if !entity.has_entity_name() {
        return name.map(str::to_string);
    }
    match (entity.device_info(), name) {
        (Some(device), Some(name)) => Some(format!("{} {}", device.name, name)),
        (Some(device), None) => Some(device.name),
        (None, name) => name.map(str::to_string),
    }
}

/// Render a sensor into the state the host would store
///
/// Unavailable entities render as `unavailable`; a missing or null value
/// renders as `unknown`. String values are used verbatim, other scalars use
/// their JSON text.
pub fn render_sensor_state(entity: &dyn SensorEntity) -> SensorStateSnapshot {
    let state = if !entity.available() {
        STATE_UNAVAILABLE.to_string()
    } else {
        match entity.native_value() {
            None | Some(serde_json::Value::Null) => STATE_UNKNOWN.to_string(),
            Some(serde_json::Value::String(s)) => s,
            Some(other) => other.to_string(),
        }
    };

    let mut attributes = Attributes::new();
    if let Some(name) = friendly_name(entity) {
        attributes.insert(ATTR_FRIENDLY_NAME.to_string(), name.into());
    }
    if let Some(device_class) = entity.device_class() {
        attributes.insert(ATTR_DEVICE_CLASS.to_string(), device_class.as_str().into());
    }
    if let Some(unit) = entity.native_unit_of_measurement() {
        attributes.insert(ATTR_UNIT_OF_MEASUREMENT.to_string(), unit.into());
    }
    if let Some(state_class) = entity.state_class() {
        attributes.insert(ATTR_STATE_CLASS.to_string(), state_class.as_str().into());
    }
    if let Some(extra) = entity.extra_state_attributes() {
        attributes.extend(extra);
    }

    trace!(
        unique_id = entity.unique_id().unwrap_or_default(),
        state = %state,
        "Rendered sensor state"
    );

    SensorStateSnapshot { state, attributes }
}
