//! Core host types for Home Assistant integrations
//!
//! This crate provides the surface an integration platform talks to:
//! ConfigEntry, DeviceInfo, the Entity and SensorEntity capability traits,
//! and the rendering of a sensor entity into its host state.

mod config_entry;
mod device_info;
mod entity;
mod sensor;

pub use config_entry::{ConfigEntry, ConfigEntryState};
pub use device_info::{DeviceIdentifier, DeviceInfo};
pub use entity::{AddEntities, Attributes, Entity};
pub use sensor::{
    render_sensor_state, SensorDeviceClass, SensorEntity, SensorStateClass, SensorStateSnapshot,
    UnknownClassError,
};

/// State value for an entity that cannot currently be reached
pub const STATE_UNAVAILABLE: &str = "unavailable";

/// State value for an entity without a known value
pub const STATE_UNKNOWN: &str = "unknown";

/// Standard attribute keys written by the host
pub mod attrs {
    /// Data source credit shown alongside an entity
    pub const ATTR_ATTRIBUTION: &str = "attribution";

    pub const ATTR_FRIENDLY_NAME: &str = "friendly_name";

    pub const ATTR_DEVICE_CLASS: &str = "device_class";

    pub const ATTR_UNIT_OF_MEASUREMENT: &str = "unit_of_measurement";

    pub const ATTR_STATE_CLASS: &str = "state_class";
}
