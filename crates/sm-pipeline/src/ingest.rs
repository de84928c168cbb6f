//! Wires the pure [`transform`](crate::transform) functions to a live
//! broker subscription: one [`MessageHandler`] registered on the ingest
//! topic, running as the `system` principal.

use std::sync::Arc;

use sm_broker::{MessageHandler, Publisher};
use sm_credentials::{CredentialStore, StoreError};
use tracing::warn;

use crate::transform::{parse_and_validate, transform};

pub struct IngestHandler<P: Publisher> {
    store: Arc<CredentialStore>,
    publisher: Arc<P>,
}

impl<P: Publisher> IngestHandler<P> {
    pub fn new(store: Arc<CredentialStore>, publisher: Arc<P>) -> Self {
        Self { store, publisher }
    }

    async fn resolve_topic(&self, sensor_id: &str, quantity: &str) -> Result<String, StoreError> {
        match self.store.topic_for(sensor_id).await {
            Ok(topic) => Ok(topic),
            Err(StoreError::NotFound(_)) => match self.store.add_sensor(sensor_id, quantity).await {
                Ok(topic) => Ok(topic),
                Err(StoreError::AlreadyExists(_)) => self.store.topic_for(sensor_id).await,
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        }
    }
}

#[async_trait::async_trait]
impl<P: Publisher> MessageHandler for IngestHandler<P> {
    async fn handle(&self, _topic: &str, payload: Vec<u8>) {
        let message = match parse_and_validate(&payload) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "dropping malformed ingest message");
                return;
            }
        };

        let outbound_topic = match self.resolve_topic(&message.sensor_id, &message.quantity).await {
            Ok(topic) => topic,
            Err(e) => {
                warn!(sensor_id = %message.sensor_id, error = %e, "dropping ingest message, could not resolve topic");
                return;
            }
        };

        let outgoing = transform(message);
        let body = match serde_json::to_vec(&outgoing) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "failed to serialize outgoing message");
                return;
            }
        };

        if let Err(e) = self.publisher.publish(outbound_topic.clone(), body).await {
            warn!(topic = %outbound_topic, error = %e, "failed to publish transformed reading");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex as AsyncMutex;

    struct RecordingPublisher {
        published: AsyncMutex<Vec<(String, Vec<u8>)>>,
    }

    impl RecordingPublisher {
        fn new() -> Self {
            Self {
                published: AsyncMutex::new(Vec::new()),
            }
        }

        async fn messages(&self) -> Vec<(String, Vec<u8>)> {
            self.published.lock().await.clone()
        }
    }

    #[async_trait::async_trait]
    impl Publisher for RecordingPublisher {
        async fn publish(&self, topic: String, payload: Vec<u8>) -> Result<(), sm_broker::BrokerError> {
            self.published.lock().await.push((topic, payload));
            Ok(())
        }
    }

    async fn fresh_store() -> (tempfile::TempDir, Arc<CredentialStore>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = CredentialStore::load_or_create(path, "admin-token", "driver-token")
            .await
            .unwrap();
        (dir, Arc::new(store))
    }

    fn payload(sensor_id: &str, timestamp: &str) -> Vec<u8> {
        format!(
            "{{\"SensorId\":\"{sensor_id}\",\"SensorType\":\"AM2302\",\"Quantity\":\"temperature\",\
             \"Timestamp\":\"{timestamp}\",\"Value\":21.5,\"Unit\":\"C\"}}"
        )
        .into_bytes()
    }

    #[tokio::test]
    async fn first_sensor_ingress_provisions_and_republishes() {
        let (_dir, store) = fresh_store().await;
        let publisher = Arc::new(RecordingPublisher::new());
        let handler = IngestHandler::new(store.clone(), publisher.clone());

        handler
            .handle("/sensor-manager/sensor-incoming", payload("s1", "2024-01-01T00:00:00Z"))
            .await;

        assert_eq!(store.topic_for("s1").await.unwrap(), "/sensor-manager/values/s1");

        let published = publisher.messages().await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "/sensor-manager/values/s1");
        let body: serde_json::Value = serde_json::from_slice(&published[0].1).unwrap();
        assert_eq!(body["Timestamp"], "2024-01-01T00:00:00Z");
        assert_eq!(body["Value"], 21.5);
        assert_eq!(body["Unit"], "C");
        assert!(body.get("SensorId").is_none());
    }

    #[tokio::test]
    async fn sensor_id_is_sanitized_in_outbound_topic() {
        let (_dir, store) = fresh_store().await;
        let publisher = Arc::new(RecordingPublisher::new());
        let handler = IngestHandler::new(store.clone(), publisher.clone());

        handler
            .handle("/sensor-manager/sensor-incoming", payload("a/b c", "2024-01-01T00:00:00Z"))
            .await;

        let published = publisher.messages().await;
        assert_eq!(published[0].0, "/sensor-manager/values/a_b_c");
    }

    #[tokio::test]
    async fn invalid_timestamp_drops_without_mutation_or_publish() {
        let (_dir, store) = fresh_store().await;
        let publisher = Arc::new(RecordingPublisher::new());
        let handler = IngestHandler::new(store.clone(), publisher.clone());

        handler
            .handle("/sensor-manager/sensor-incoming", payload("s1", "not-a-date"))
            .await;

        assert!(store.topic_for("s1").await.is_err());
        assert!(publisher.messages().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_json_drops_without_mutation_or_publish() {
        let (_dir, store) = fresh_store().await;
        let publisher = Arc::new(RecordingPublisher::new());
        let handler = IngestHandler::new(store.clone(), publisher.clone());

        handler
            .handle("/sensor-manager/sensor-incoming", b"not json".to_vec())
            .await;

        assert!(publisher.messages().await.is_empty());
    }

    #[tokio::test]
    async fn second_reading_for_known_sensor_reuses_topic() {
        let (_dir, store) = fresh_store().await;
        let publisher = Arc::new(RecordingPublisher::new());
        let handler = IngestHandler::new(store.clone(), publisher.clone());

        handler
            .handle("/sensor-manager/sensor-incoming", payload("s1", "2024-01-01T00:00:00Z"))
            .await;
        handler
            .handle("/sensor-manager/sensor-incoming", payload("s1", "2024-01-01T00:01:00Z"))
            .await;

        let published = publisher.messages().await;
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].0, published[1].0);
    }
}
