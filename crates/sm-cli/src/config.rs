//! Reads the sensor-manager's entire configuration from environment
//! variables. There is no config-file layer for the service itself — see
//! the crate-level design notes for why. Every mandatory variable that
//! is missing, or fails to parse as its expected type, is fatal:
//! `load()` exits the process with a descriptive message rather than
//! returning an error.

use std::path::PathBuf;

use tracing::info;

/// Fully resolved startup configuration for `sensor-manager`.
pub struct Config {
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_path_suffix: String,
    pub http_port: u16,
    pub auth_db_file: PathBuf,
    pub administrator_access_token: String,
    pub sensor_driver_access_token: String,
    /// Read and validated as mandatory, like every other variable, but
    /// otherwise unused: see the crate-level design notes on why this
    /// implementation does not reseed a CSPRNG from it.
    pub application_secret: String,
    pub cimi_host: String,
    pub cimi_port: u16,
    pub lifecycle_host: String,
    pub lifecycle_port: u16,
    pub sensors_check_interval_seconds: u64,
    pub sensor_container_map_file: PathBuf,
    pub sensor_driver_docker_network_name: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("mqtt_host", &self.mqtt_host)
            .field("mqtt_port", &self.mqtt_port)
            .field("mqtt_path_suffix", &self.mqtt_path_suffix)
            .field("http_port", &self.http_port)
            .field("auth_db_file", &self.auth_db_file)
            .field("administrator_access_token", &"<redacted>")
            .field("sensor_driver_access_token", &"<redacted>")
            .field("application_secret", &"<redacted>")
            .field("cimi_host", &self.cimi_host)
            .field("cimi_port", &self.cimi_port)
            .field("lifecycle_host", &self.lifecycle_host)
            .field("lifecycle_port", &self.lifecycle_port)
            .field("sensors_check_interval_seconds", &self.sensors_check_interval_seconds)
            .field("sensor_container_map_file", &self.sensor_container_map_file)
            .field("sensor_driver_docker_network_name", &self.sensor_driver_docker_network_name)
            .finish()
    }
}

/// Reads and validates every variable in one pass. Exits the process
/// (non-zero) on the first missing or unparseable one.
pub fn load() -> Config {
    Config {
        mqtt_host: get_env_mandatory_string("MQTT_HOST"),
        mqtt_port: get_env_mandatory_u16("MQTT_PORT"),
        mqtt_path_suffix: get_env_mandatory_string("MQTT_PATH_SUFFIX"),
        http_port: get_env_mandatory_u16("HTTP_PORT"),
        auth_db_file: PathBuf::from(get_env_mandatory_string("AUTH_DB_FILE")),
        administrator_access_token: get_env_mandatory_secret("ADMINISTRATOR_ACCESS_TOKEN"),
        sensor_driver_access_token: get_env_mandatory_secret("SENSOR_DRIVER_ACCESS_TOKEN"),
        application_secret: get_env_mandatory_secret("APPLICATION_SECRET"),
        cimi_host: get_env_mandatory_string("CIMI_HOST"),
        cimi_port: get_env_mandatory_u16("CIMI_PORT"),
        lifecycle_host: get_env_mandatory_string("LIFECYCLE_HOST"),
        lifecycle_port: get_env_mandatory_u16("LIFECYCLE_PORT"),
        sensors_check_interval_seconds: get_env_mandatory_u64("SENSORS_CHECK_INTERVAL_SECONDS"),
        sensor_container_map_file: PathBuf::from(get_env_mandatory_string("SENSOR_CONTAINER_MAP_FILE")),
        sensor_driver_docker_network_name: get_env_mandatory_string("SENSOR_DRIVER_DOCKER_NETWORK_NAME"),
    }
}

fn fatal_missing(name: &str) -> ! {
    eprintln!("sensor-manager: missing required environment variable {name}");
    std::process::exit(1);
}

fn fatal_unparseable(name: &str, value: &str) -> ! {
    eprintln!("sensor-manager: environment variable {name}={value:?} is not valid");
    std::process::exit(1);
}

fn get_env_mandatory_string(name: &str) -> String {
    match std::env::var(name) {
        Ok(value) => {
            info!(name, value = %value, "read mandatory environment variable");
            value
        }
        Err(_) => fatal_missing(name),
    }
}

fn get_env_mandatory_secret(name: &str) -> String {
    match std::env::var(name) {
        Ok(value) => {
            info!(name, value = "<redacted>", "read mandatory secret environment variable");
            value
        }
        Err(_) => fatal_missing(name),
    }
}

fn get_env_mandatory_u16(name: &str) -> u16 {
    let value = get_env_mandatory_string(name);
    value.parse().unwrap_or_else(|_| fatal_unparseable(name, &value))
}

fn get_env_mandatory_u64(name: &str) -> u64 {
    let value = get_env_mandatory_string(name);
    value.parse().unwrap_or_else(|_| fatal_unparseable(name, &value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_every_secret_field() {
        let cfg = Config {
            mqtt_host: "mqtt.local".to_string(),
            mqtt_port: 1883,
            mqtt_path_suffix: "".to_string(),
            http_port: 8080,
            auth_db_file: PathBuf::from("/data/auth.json"),
            administrator_access_token: "super-secret-admin".to_string(),
            sensor_driver_access_token: "super-secret-driver".to_string(),
            application_secret: "super-secret-app".to_string(),
            cimi_host: "cimi.local".to_string(),
            cimi_port: 10443,
            lifecycle_host: "lifecycle.local".to_string(),
            lifecycle_port: 46080,
            sensors_check_interval_seconds: 5,
            sensor_container_map_file: PathBuf::from("/data/map.json"),
            sensor_driver_docker_network_name: "mf2c_net".to_string(),
        };
        let debug_str = format!("{cfg:?}");
        assert!(!debug_str.contains("super-secret-admin"));
        assert!(!debug_str.contains("super-secret-driver"));
        assert!(!debug_str.contains("super-secret-app"));
        assert!(debug_str.contains("mqtt.local"));
    }
}
