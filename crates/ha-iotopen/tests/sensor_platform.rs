//! End-to-end tests for the IoT Open sensor platform
//!
//! These tests set up a config entry against a coordinator seeded from
//! `tests/fixtures/functions.json` and check the entities handed to the host.

mod common;

use std::collections::HashSet;

use common::{init_tracing, load_functions, sample_coordinator};
use ha_core::{
    render_sensor_state, ConfigEntry, ConfigEntryState, DeviceIdentifier, Entity,
    SensorDeviceClass, SensorEntity, SensorStateClass, STATE_UNAVAILABLE,
};
use ha_iotopen::{
    function_map, is_binary_function, sensor, IoTOpenData, IoTOpenFunctionSensor, SetupError,
    DOMAIN,
};
use serde_json::json;

async fn setup_sample() -> (IoTOpenData, ConfigEntry, Vec<IoTOpenFunctionSensor>) {
    init_tracing();
    let data = IoTOpenData::new();
    let mut entry = ConfigEntry::new(DOMAIN, "Home");
    let mut added: Vec<IoTOpenFunctionSensor> = Vec::new();

    ha_iotopen::async_setup_entry(&data, &mut entry, sample_coordinator(), &mut |entities| {
        added.extend(entities)
    })
    .await
    .unwrap();

    (data, entry, added)
}

fn find(sensors: &[IoTOpenFunctionSensor], function_id: i64) -> &IoTOpenFunctionSensor {
    sensors
        .iter()
        .find(|s| s.function_id() == function_id)
        .unwrap_or_else(|| panic!("no sensor for function {}", function_id))
}

// ============================================================================
// Entity factory
// ============================================================================

#[tokio::test]
async fn test_setup_creates_one_sensor_per_non_binary_function() {
    let (data, entry, sensors) = setup_sample().await;

    assert!(entry.is_loaded());
    assert_eq!(data.len(), 1);

    let ids: Vec<i64> = sensors.iter().map(|s| s.function_id()).collect();
    assert_eq!(ids, vec![101, 102, 104, 105, 106]);

    let binary: HashSet<i64> = load_functions()
        .iter()
        .filter(|s| is_binary_function(s))
        .map(|s| s.function_id)
        .collect();
    assert_eq!(binary, HashSet::from([103, 107]));
    assert!(ids.iter().all(|id| !binary.contains(id)));

    let unique_ids: HashSet<&str> = sensors.iter().filter_map(|s| s.unique_id()).collect();
    assert_eq!(unique_ids.len(), sensors.len());
    assert!(sensors.iter().all(|s| s.entry_id() == entry.entry_id));
}

#[tokio::test]
async fn test_platform_setup_without_coordinator_fails() {
    let data = IoTOpenData::new();
    let entry = ConfigEntry::new(DOMAIN, "Home");
    let mut calls = 0;

    let err = sensor::async_setup_entry(&data, &entry, &mut |_| calls += 1)
        .await
        .unwrap_err();

    assert!(matches!(err, SetupError::NotLoaded { .. }));
    assert_eq!(calls, 0);
}

#[tokio::test]
async fn test_setup_with_failed_refresh_is_not_ready() {
    let data = IoTOpenData::new();
    let mut entry = ConfigEntry::new(DOMAIN, "Home");
    let coordinator = sample_coordinator();
    coordinator.set_update_error("401 Unauthorized");

    let err = ha_iotopen::async_setup_entry(&data, &mut entry, coordinator, &mut |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, SetupError::NotReady { .. }));
    assert_eq!(entry.state, ConfigEntryState::SetupError);
    assert!(entry.reason.as_deref().unwrap().contains("401 Unauthorized"));
    assert!(data.is_empty());
}

#[tokio::test]
async fn test_unload_entry() {
    let (data, mut entry, _sensors) = setup_sample().await;

    assert!(ha_iotopen::async_unload_entry(&data, &mut entry).await);
    assert_eq!(entry.state, ConfigEntryState::NotLoaded);
    assert!(data.is_empty());

    // Second unload is a no-op
    assert!(!ha_iotopen::async_unload_entry(&data, &mut entry).await);
}

// ============================================================================
// Sensor classification
// ============================================================================

#[tokio::test]
async fn test_sample_classification() {
    let (_data, _entry, sensors) = setup_sample().await;

    let temperature = find(&sensors, 101);
    assert_eq!(temperature.unique_id(), Some("iotopen_3_func_101"));
    assert_eq!(temperature.name(), Some("Living room temperature"));
    assert_eq!(
        temperature.device_class(),
        Some(SensorDeviceClass::Temperature)
    );
    assert_eq!(temperature.native_unit_of_measurement(), Some("°C"));

    let humidity = find(&sensors, 102);
    assert_eq!(humidity.device_class(), Some(SensorDeviceClass::Humidity));
    assert_eq!(humidity.native_unit_of_measurement(), Some("%"));

    let power = find(&sensors, 104);
    assert_eq!(power.device_class(), Some(SensorDeviceClass::Power));
    assert_eq!(power.native_unit_of_measurement(), Some("Watt"));
    assert_eq!(power.state_class(), Some(SensorStateClass::Measurement));

    let energy = find(&sensors, 105);
    assert_eq!(energy.device_class(), Some(SensorDeviceClass::Energy));
    assert_eq!(energy.native_unit_of_measurement(), Some("kWh"));
    assert_eq!(energy.state_class(), Some(SensorStateClass::TotalIncreasing));

    let generic = find(&sensors, 106);
    assert_eq!(generic.device_class(), None);
    assert_eq!(generic.native_unit_of_measurement(), None);
    assert_eq!(generic.state_class(), None);
}

// ============================================================================
// Live snapshot tracking
// ============================================================================

#[tokio::test]
async fn test_rendered_states() {
    let (_data, _entry, sensors) = setup_sample().await;

    let snapshot = render_sensor_state(find(&sensors, 105));
    assert_eq!(snapshot.state, "18342.7");
    assert_eq!(snapshot.attributes["device_class"], json!("energy"));
    assert_eq!(snapshot.attributes["state_class"], json!("total_increasing"));
    assert_eq!(snapshot.attributes["unit_of_measurement"], json!("kWh"));
    assert_eq!(snapshot.attributes["attribution"], json!("Data via IoT Open"));
    assert_eq!(snapshot.attributes["topic_read"], json!("obj/mbus/1/energy"));
    assert_eq!(
        snapshot.attributes["friendly_name"],
        json!("IoT Open Installation 3 Main meter")
    );

    let snapshot = render_sensor_state(find(&sensors, 102));
    assert_eq!(
        snapshot.attributes["friendly_name"],
        json!("IoT Open Device 7 Living room humidity")
    );

    let snapshot = render_sensor_state(find(&sensors, 106));
    assert_eq!(snapshot.state, "idle");
    assert!(!snapshot.attributes.contains_key("unit_of_measurement"));
}

#[tokio::test]
async fn test_eviction_makes_sensor_unavailable() {
    let (data, entry, sensors) = setup_sample().await;
    let coordinator = data.coordinator(&entry.entry_id).unwrap();

    let remaining = load_functions()
        .into_iter()
        .filter(|s| s.function_id != 101);
    coordinator.set_updated_data(function_map(remaining));

    let evicted = find(&sensors, 101);
    assert!(!evicted.available());
    assert_eq!(evicted.native_value(), None);
    assert_eq!(
        evicted.extra_state_attributes().unwrap().keys().collect::<Vec<_>>(),
        vec!["attribution"]
    );
    let info = evicted.device_info().unwrap();
    assert!(info.has_identifier(&DeviceIdentifier::new(DOMAIN, "installation_unknown")));
    assert_eq!(render_sensor_state(evicted).state, STATE_UNAVAILABLE);

    // Frozen identity survives eviction
    assert_eq!(evicted.unique_id(), Some("iotopen_3_func_101"));

    let kept = find(&sensors, 102);
    assert!(kept.available());
    assert_eq!(kept.native_value(), Some(json!(41)));
}

#[tokio::test]
async fn test_device_grouping_follows_device_id() {
    let (_data, _entry, sensors) = setup_sample().await;

    let on_device = find(&sensors, 102).device_info().unwrap();
    assert!(on_device.has_identifier(&DeviceIdentifier::new(DOMAIN, "device_7")));
    assert_eq!(on_device.name, "IoT Open Device 7");

    let on_installation = find(&sensors, 104).device_info().unwrap();
    assert!(on_installation.has_identifier(&DeviceIdentifier::new(DOMAIN, "installation_3")));
    assert_eq!(on_installation.name, "IoT Open Installation 3");
}
