//! Integration-wide constants

/// Integration domain
pub const DOMAIN: &str = "iotopen";

/// Platforms this integration forwards config entries to
pub const PLATFORMS: &[&str] = &["sensor"];

/// Credit line added to every entity's attributes
pub const ATTRIBUTION: &str = "Data via IoT Open";

pub const MANUFACTURER: &str = "IoT Open";

pub const MODEL: &str = "Lynx";

/// Prefix of every unique id produced by this integration
pub const UNIQUE_ID_PREFIX: &str = "iotopen";

/// Device identifier used when a function's installation can no longer be resolved
pub const UNKNOWN_INSTALLATION: &str = "installation_unknown";
