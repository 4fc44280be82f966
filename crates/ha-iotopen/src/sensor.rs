//! Sensor platform for IoT Open
//!
//! Every non-binary function becomes one [`IoTOpenFunctionSensor`]. The
//! sensor only remembers its `function_id`; value, attributes, device
//! grouping and availability are looked up in the coordinator's current
//! snapshot on every read, so an evicted function turns unavailable without
//! any teardown.

use std::sync::Arc;

use ha_core::attrs::ATTR_ATTRIBUTION;
use ha_core::{
    AddEntities, Attributes, ConfigEntry, DeviceIdentifier, DeviceInfo, Entity, SensorDeviceClass,
    SensorEntity, SensorStateClass,
};
use serde_json::json;
use tracing::{debug, instrument};

use crate::classify::guess_sensor_characteristics;
use crate::constants::{
    ATTRIBUTION, DOMAIN, MANUFACTURER, MODEL, UNIQUE_ID_PREFIX, UNKNOWN_INSTALLATION,
};
use crate::coordinator::{is_binary_function, FunctionMap, FunctionState, IoTOpenCoordinator};
use crate::error::{SetupError, SetupResult};
use crate::IoTOpenData;

/// Set up IoT Open sensors for a config entry
///
/// Binary functions are skipped; they belong to the binary sensor platform.
#[instrument(skip_all, fields(entry_id = %entry.entry_id))]
pub async fn async_setup_entry(
    data: &IoTOpenData,
    entry: &ConfigEntry,
    add_entities: &mut AddEntities<'_, IoTOpenFunctionSensor>,
) -> SetupResult<()> {
    let coordinator = data
        .coordinator(&entry.entry_id)
        .ok_or_else(|| SetupError::NotLoaded {
            entry_id: entry.entry_id.clone(),
        })?;

    let snapshot = coordinator.data();
    let entities = build_sensors(&coordinator, &snapshot, &entry.entry_id)?;
    debug!(
        sensors = entities.len(),
        skipped = snapshot.len() - entities.len(),
        "Adding IoT Open sensors"
    );

    add_entities(entities);
    Ok(())
}

/// Build one sensor per non-binary function in `snapshot`
///
/// `snapshot` is a snapshot taken from `coordinator`; sensors are returned in
/// its order and bound to the coordinator for later reads.
pub fn build_sensors(
    coordinator: &Arc<IoTOpenCoordinator>,
    snapshot: &FunctionMap,
    entry_id: &str,
) -> SetupResult<Vec<IoTOpenFunctionSensor>> {
    snapshot
        .values()
        .filter(|state| !is_binary_function(state))
        .map(|state| IoTOpenFunctionSensor::new(coordinator.clone(), state.function_id, entry_id))
        .collect()
}

/// Sensor representing one non-binary IoT Open function
#[derive(Debug)]
pub struct IoTOpenFunctionSensor {
    coordinator: Arc<IoTOpenCoordinator>,
    function_id: i64,
    entry_id: String,
    unique_id: String,
    name: String,
    device_class: Option<SensorDeviceClass>,
    unit: Option<String>,
    state_class: Option<SensorStateClass>,
}

impl IoTOpenFunctionSensor {
    /// Create the sensor for `function_id`
    ///
    /// The function must be present in the coordinator's current data. Name
    /// and classification are taken from that state and never re-evaluated.
    pub fn new(
        coordinator: Arc<IoTOpenCoordinator>,
        function_id: i64,
        entry_id: impl Into<String>,
    ) -> SetupResult<Self> {
        let state = coordinator
            .get(function_id)
            .ok_or(SetupError::UnknownFunction { function_id })?;

        let characteristics = guess_sensor_characteristics(&state);

        Ok(Self {
            unique_id: format!(
                "{UNIQUE_ID_PREFIX}_{}_func_{}",
                state.installation_id, state.function_id
            ),
            name: state.name,
            device_class: characteristics.device_class,
            unit: characteristics.unit,
            state_class: characteristics.state_class,
            coordinator,
            function_id,
            entry_id: entry_id.into(),
        })
    }

    pub fn function_id(&self) -> i64 {
        self.function_id
    }

    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    fn state(&self) -> Option<FunctionState> {
        self.coordinator.get(self.function_id)
    }
}

impl Entity for IoTOpenFunctionSensor {
    fn unique_id(&self) -> Option<&str> {
        Some(&self.unique_id)
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn has_entity_name(&self) -> bool {
        true
    }

    /// Available while the coordinator has state for this function
    fn available(&self) -> bool {
        self.coordinator.contains(self.function_id)
    }

    fn extra_state_attributes(&self) -> Option<Attributes> {
        let mut attributes = Attributes::new();
        attributes.insert(ATTR_ATTRIBUTION.to_string(), json!(ATTRIBUTION));

        if let Some(state) = self.state() {
            attributes.insert("installation_id".to_string(), json!(state.installation_id));
            attributes.insert("function_id".to_string(), json!(state.function_id));
            attributes.insert("type".to_string(), json!(state.function_type));
            attributes.insert("topic_read".to_string(), json!(state.topic_read));
            attributes.insert(
                "last_timestamp".to_string(),
                json!(state.last_timestamp.map(|ts| ts.to_rfc3339())),
            );
            attributes.insert("device_id".to_string(), json!(state.device_id));
        }

        Some(attributes)
    }

    /// Group under the function's device, or its installation when it has none
    fn device_info(&self) -> Option<DeviceInfo> {
        let (identifier, name) = match self.state() {
            None => (
                UNKNOWN_INSTALLATION.to_string(),
                "IoT Open Installation".to_string(),
            ),
            Some(FunctionState {
                device_id: Some(device_id),
                ..
            }) => (
                format!("device_{device_id}"),
                format!("IoT Open Device {device_id}"),
            ),
            Some(state) => (
                format!("installation_{}", state.installation_id),
                format!("IoT Open Installation {}", state.installation_id),
            ),
        };

        Some(
            DeviceInfo::new(DeviceIdentifier::new(DOMAIN, identifier), name)
                .with_manufacturer(MANUFACTURER)
                .with_model(MODEL),
        )
    }
}

impl SensorEntity for IoTOpenFunctionSensor {
    fn native_value(&self) -> Option<serde_json::Value> {
        self.state().map(|state| state.last_value)
    }

    fn device_class(&self) -> Option<SensorDeviceClass> {
        self.device_class
    }

    fn native_unit_of_measurement(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    fn state_class(&self) -> Option<SensorStateClass> {
        self.state_class
    }
}
