//! Shared helpers for IoT Open integration tests

use std::path::Path;
use std::sync::Arc;

use ha_iotopen::{FunctionState, IoTOpenCoordinator};

/// Load a fixture file from `tests/fixtures/`
pub fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);

    std::fs::read_to_string(&path).unwrap_or_else(|e| {
        panic!("Failed to load fixture '{}' from {:?}: {}", name, path, e)
    })
}

/// Load the function states of the sample installation
pub fn load_functions() -> Vec<FunctionState> {
    let content = load_fixture("functions.json");
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse functions fixture: {}", e))
}

/// Coordinator seeded with the sample installation
pub fn sample_coordinator() -> Arc<IoTOpenCoordinator> {
    Arc::new(IoTOpenCoordinator::with_states(
        "IoT Open Lynx",
        load_functions(),
    ))
}

/// Install a test log subscriber; repeated calls are ignored
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("ha_iotopen=debug")
        .with_test_writer()
        .try_init();
}
