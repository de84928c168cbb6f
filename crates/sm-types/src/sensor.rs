use serde::{Deserialize, Serialize};

/// A provisioned sensor's topic and credentials, as persisted in the
/// credential store. Field names are PascalCase to match the on-disk
/// format exactly, for backward compatibility with existing store files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorTopic {
    #[serde(rename = "SensorId")]
    pub sensor_id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Quantity")]
    pub quantity: String,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Password")]
    pub password: String,
}

/// Raw sensor reading as published by a driver to the ingestion topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingSensorMessage {
    #[serde(rename = "SensorId")]
    pub sensor_id: String,
    #[serde(rename = "SensorType")]
    pub sensor_type: String,
    #[serde(rename = "Quantity")]
    pub quantity: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Value")]
    pub value: f64,
    #[serde(rename = "Unit")]
    pub unit: String,
}

/// The transformed, per-sensor-topic message handed to consumers. Strips
/// everything a subscriber to a specific sensor's topic already knows
/// (the sensor id, type, and quantity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingClientMessage {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Value")]
    pub value: f64,
    #[serde(rename = "Unit")]
    pub unit: String,
}

impl From<IncomingSensorMessage> for OutgoingClientMessage {
    fn from(incoming: IncomingSensorMessage) -> Self {
        OutgoingClientMessage {
            timestamp: incoming.timestamp,
            value: incoming.value,
            unit: incoming.unit,
        }
    }
}

/// A sensor as reported by the platform inventory, with its
/// double-JSON-encoded fields already re-parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDescriptor {
    pub hardware_model: String,
    pub dimensions: Vec<String>,
    pub connection_parameters: serde_json::Map<String, serde_json::Value>,
}

/// Everything needed to render a driver container's Docker-Compose
/// payload and its injected environment.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverSpec {
    pub hardware_model: String,
    pub docker_image_path: String,
    pub docker_image_version: String,
    pub docker_network_name: String,
    pub environment: Vec<(String, String)>,
}

impl DriverSpec {
    /// `sensor-driver-<hardware_model>`, the CIMI service name derived
    /// from a hardware model.
    pub fn cimi_service_name(&self) -> String {
        format!("sensor-driver-{}", self.hardware_model)
    }
}
