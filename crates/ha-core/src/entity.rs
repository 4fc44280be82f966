//! Entity capability trait implemented by integration platforms

use std::collections::HashMap;

use crate::DeviceInfo;

/// Attribute map attached to an entity's state
pub type Attributes = HashMap<String, serde_json::Value>;

/// Callback a platform uses to hand its entities to the host
///
/// Called once per platform setup with every entity created for the entry.
pub type AddEntities<'a, E> = dyn FnMut(Vec<E>) + Send + 'a;

/// The accessors the host reads from every entity
///
/// Values returned here are read on every state write, so implementations
/// should resolve them from their data source instead of caching.
pub trait Entity: Send + Sync {
    /// Stable identifier used by the entity registry
    fn unique_id(&self) -> Option<&str>;

    /// Entity name; prefixed with the device name when `has_entity_name`
    fn name(&self) -> Option<&str>;

    /// Whether `friendly_name` is built from the device name plus `name`
    fn has_entity_name(&self) -> bool {
        false
    }

    /// Whether the entity currently has a reachable data source
    fn available(&self) -> bool {
        true
    }

    fn extra_state_attributes(&self) -> Option<Attributes> {
        None
    }

    fn device_info(&self) -> Option<DeviceInfo> {
        None
    }
}
