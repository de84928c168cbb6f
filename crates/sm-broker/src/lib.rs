//! A thin wrapper over `rumqttc` maintaining one principal's long-lived
//! session to the MQTT broker.

mod client;
mod error;
mod handler;
mod publisher;

pub use client::{BrokerClient, BrokerOptions};
pub use error::BrokerError;
pub use handler::{FnHandler, MessageHandler};
pub use publisher::Publisher;
