//! IoT Open integration
//!
//! Projects functions polled from an IoT Open (Lynx) installation into
//! sensor entities. Each config entry owns one [`IoTOpenCoordinator`]; the
//! sensor platform reads its snapshot and creates one sensor per non-binary
//! function.

pub mod classify;
pub mod constants;
pub mod coordinator;
mod error;
pub mod sensor;

use std::sync::Arc;

use dashmap::DashMap;
use ha_core::{AddEntities, ConfigEntry};
use tracing::{info, instrument, warn};

pub use classify::{guess_sensor_characteristics, SensorCharacteristics};
pub use constants::{ATTRIBUTION, DOMAIN, PLATFORMS};
pub use coordinator::{
    function_map, is_binary_function, FunctionMap, FunctionMeta, FunctionState,
    IoTOpenCoordinator,
};
pub use error::{SetupError, SetupResult};
pub use sensor::IoTOpenFunctionSensor;

/// Runtime data of the integration, keyed by config entry id
#[derive(Debug, Default)]
pub struct IoTOpenData {
    coordinators: DashMap<String, Arc<IoTOpenCoordinator>>,
}

impl IoTOpenData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coordinator registered for `entry_id`
    pub fn coordinator(&self, entry_id: &str) -> Option<Arc<IoTOpenCoordinator>> {
        self.coordinators.get(entry_id).map(|c| c.clone())
    }

    pub fn register(&self, entry_id: impl Into<String>, coordinator: Arc<IoTOpenCoordinator>) {
        self.coordinators.insert(entry_id.into(), coordinator);
    }

    pub fn unregister(&self, entry_id: &str) -> Option<Arc<IoTOpenCoordinator>> {
        self.coordinators.remove(entry_id).map(|(_, c)| c)
    }

    pub fn len(&self) -> usize {
        self.coordinators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinators.is_empty()
    }
}

/// Set up a config entry and forward it to the sensor platform
///
/// The coordinator must have completed a successful refresh. On failure the
/// entry is marked as a setup error and its coordinator is unregistered.
#[instrument(skip_all, fields(entry_id = %entry.entry_id))]
pub async fn async_setup_entry(
    data: &IoTOpenData,
    entry: &mut ConfigEntry,
    coordinator: Arc<IoTOpenCoordinator>,
    add_sensors: &mut AddEntities<'_, IoTOpenFunctionSensor>,
) -> SetupResult<()> {
    entry.set_setup_in_progress();

    if !coordinator.last_update_success() {
        let err = SetupError::NotReady {
            name: coordinator.name().to_string(),
            reason: coordinator
                .last_error()
                .unwrap_or_else(|| "no data".to_string()),
        };
        warn!("Setup failed: {}", err);
        entry.set_setup_error(err.to_string());
        return Err(err);
    }

    data.register(entry.entry_id.clone(), coordinator);

    if let Err(err) = sensor::async_setup_entry(data, entry, add_sensors).await {
        warn!("Sensor platform setup failed: {}", err);
        data.unregister(&entry.entry_id);
        entry.set_setup_error(err.to_string());
        return Err(err);
    }

    entry.set_loaded();
    info!(title = %entry.title, platforms = ?PLATFORMS, "IoT Open entry loaded");
    Ok(())
}

/// Unload a config entry, dropping its coordinator
///
/// Returns false when the entry was not loaded.
pub async fn async_unload_entry(data: &IoTOpenData, entry: &mut ConfigEntry) -> bool {
    let removed = data.unregister(&entry.entry_id).is_some();
    if removed {
        entry.state = ha_core::ConfigEntryState::NotLoaded;
        info!(entry_id = %entry.entry_id, "IoT Open entry unloaded");
    }
    removed
}
