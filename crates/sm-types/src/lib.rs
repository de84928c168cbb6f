//! Shared data model and error type for the sensor-manager control plane.

pub mod error;
pub mod platform;
pub mod sensor;
pub mod topic;

pub use error::SmError;
pub use platform::CimiIdentifier;
pub use sensor::{DriverSpec, IncomingSensorMessage, OutgoingClientMessage, SensorDescriptor, SensorTopic};
pub use topic::{sanitize, Access, INGEST_TOPIC, PUBLISH_ROOT};
