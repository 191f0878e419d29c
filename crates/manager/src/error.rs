//! Manager error types

use contracts::SensorId;
use sensor_factory::SensorError;
use thiserror::Error;

/// Registry and scheduling errors
///
/// The public `Manager` API reports these on the diagnostic sink and returns
/// `NO_SENSOR`/`None`/`false`; the `try_*` variants hand them back.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// `add_sensor` received nothing
    #[error("cannot register a null sensor")]
    NullSensor,

    /// Sensor already carries an id
    #[error("sensor '{name}' is already registered as {id}")]
    AlreadyRegistered { name: String, id: SensorId },

    /// Id counter ran out
    #[error("sensor id space exhausted")]
    IdSpaceExhausted,

    /// Factory could not build a sensor from the descriptor
    #[error("failed to create sensor '{name}'")]
    CreationFailed { name: String },

    /// Per-tick update failure
    #[error("sensor {id} ('{name}') failed to update: {source}")]
    UpdateFailed {
        id: SensorId,
        name: String,
        #[source]
        source: SensorError,
    },
}

/// Result alias
pub type Result<T> = std::result::Result<T, ManagerError>;
