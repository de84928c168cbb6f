//! Builds a [`DriverSpec`] for a newly observed sensor by re-reading the
//! hardware-model -> container mapping file and substituting the
//! driver's environment.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use sm_types::topic::{INGEST_TOPIC, SENSOR_DRIVER_USERNAME};
use sm_types::{DriverSpec, SensorDescriptor};

#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("failed to read sensor-container map {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sensor-container map {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no sensor driver container mapping for hardware model {0}")]
    NoMapping(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContainerMapping {
    pub image: String,
    pub version: String,
}

/// The pieces of the driver environment that are constant across every
/// sensor, read once from configuration at startup and threaded through
/// to each [`driver_spec_for_sensor`] call.
#[derive(Debug, Clone)]
pub struct DriverEnvironmentContext {
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_path_suffix: String,
    pub sensor_driver_access_token: String,
    pub sensor_driver_docker_network_name: String,
}

/// Re-reads `map_path` in full (so an operator editing it takes effect on
/// the next activation without a restart), looks up `sensor.hardware_model`,
/// and renders the full [`DriverSpec`] including environment.
pub fn driver_spec_for_sensor(
    map_path: &Path,
    sensor: &SensorDescriptor,
    ctx: &DriverEnvironmentContext,
) -> Result<DriverSpec, MappingError> {
    let contents = std::fs::read(map_path).map_err(|source| MappingError::Io {
        path: map_path.display().to_string(),
        source,
    })?;
    let mapping: HashMap<String, ContainerMapping> =
        serde_json::from_slice(&contents).map_err(|source| MappingError::Parse {
            path: map_path.display().to_string(),
            source,
        })?;

    let entry = mapping
        .get(&sensor.hardware_model)
        .ok_or_else(|| MappingError::NoMapping(sensor.hardware_model.clone()))?;

    let connection_info = serde_json::to_string(&sensor.connection_parameters)
        .expect("serializing an already-parsed JSON object cannot fail");

    let environment = vec![
        ("SENSOR_MANAGER_HOST".to_string(), ctx.mqtt_host.clone()),
        ("SENSOR_MANAGER_PORT".to_string(), ctx.mqtt_port.to_string()),
        ("SENSOR_MANAGER_PATH_SUFFIX".to_string(), ctx.mqtt_path_suffix.clone()),
        ("SENSOR_MANAGER_USERNAME".to_string(), SENSOR_DRIVER_USERNAME.to_string()),
        ("SENSOR_MANAGER_PASSWORD".to_string(), ctx.sensor_driver_access_token.clone()),
        ("SENSOR_MANAGER_TOPIC".to_string(), INGEST_TOPIC.to_string()),
        ("SENSOR_CONNECTION_INFO".to_string(), connection_info),
    ];

    Ok(DriverSpec {
        hardware_model: sensor.hardware_model.clone(),
        docker_image_path: entry.image.clone(),
        docker_image_version: entry.version.clone(),
        docker_network_name: ctx.sensor_driver_docker_network_name.clone(),
        environment,
    })
}
