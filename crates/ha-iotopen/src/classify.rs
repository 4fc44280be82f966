//! Best-effort sensor classification from free-text function fields
//!
//! IoT Open functions carry no typed measurement kind, only a `type` string,
//! a display name and optional metadata. The rules below guess the device
//! class, unit and state class. The first matching rule wins, so conflicting
//! text resolves by rule order (temperature, humidity, power, energy).

use ha_core::{SensorDeviceClass, SensorStateClass};

use crate::coordinator::FunctionState;

const DEFAULT_TEMPERATURE_UNIT: &str = "°C";
const DEFAULT_HUMIDITY_UNIT: &str = "%";
const DEFAULT_POWER_UNIT: &str = "W";

/// Device class, unit and state class guessed for one function
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SensorCharacteristics {
    pub device_class: Option<SensorDeviceClass>,
    pub unit: Option<String>,
    pub state_class: Option<SensorStateClass>,
}

/// Infer device class, unit and state class from type, name and meta
pub fn guess_sensor_characteristics(state: &FunctionState) -> SensorCharacteristics {
    let mut unit = state
        .meta
        .as_ref()
        .map(|meta| meta.unit())
        .unwrap_or_default();
    let function_type = state.function_type.to_lowercase();
    let name = state.name.to_lowercase();
    let unit_lower = unit.to_lowercase();

    let mentions = |needle: &str| function_type.contains(needle) || name.contains(needle);

    let (device_class, state_class) = if mentions("temp") {
        default_unit(&mut unit, DEFAULT_TEMPERATURE_UNIT);
        (
            Some(SensorDeviceClass::Temperature),
            Some(SensorStateClass::Measurement),
        )
    } else if mentions("humidity") {
        default_unit(&mut unit, DEFAULT_HUMIDITY_UNIT);
        (
            Some(SensorDeviceClass::Humidity),
            Some(SensorStateClass::Measurement),
        )
    } else if function_type.contains("power") || unit_lower.contains("watt") {
        default_unit(&mut unit, DEFAULT_POWER_UNIT);
        (
            Some(SensorDeviceClass::Power),
            Some(SensorStateClass::Measurement),
        )
    } else if function_type.contains("energy") || unit_lower == "kwh" || unit_lower == "wh" {
        (
            Some(SensorDeviceClass::Energy),
            Some(SensorStateClass::TotalIncreasing),
        )
    } else {
        (None, None)
    };

    SensorCharacteristics {
        device_class,
        unit: (!unit.is_empty()).then_some(unit),
        state_class,
    }
}

fn default_unit(unit: &mut String, default: &str) {
    if unit.is_empty() {
        *unit = default.to_string();
    }
}
