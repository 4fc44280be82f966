//! Error types for setting up the integration

use thiserror::Error;

/// Result type for setup operations
pub type SetupResult<T> = Result<T, SetupError>;

/// Errors that abort setting up a config entry
#[derive(Debug, Error)]
pub enum SetupError {
    /// No coordinator is registered for the entry
    #[error("no coordinator registered for config entry {entry_id}")]
    NotLoaded { entry_id: String },

    /// The coordinator has not produced a successful refresh yet
    #[error("coordinator for {name} is not ready: {reason}")]
    NotReady { name: String, reason: String },

    /// An entity was built for a function the coordinator does not know
    #[error("function {function_id} is not present in coordinator data")]
    UnknownFunction { function_id: i64 },
}
