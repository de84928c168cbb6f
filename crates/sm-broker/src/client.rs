//! A long-lived publish/subscribe session to the MQTT broker on behalf
//! of one principal.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::BrokerError;
use crate::handler::MessageHandler;
use crate::publisher::Publisher;

const KEEPALIVE: Duration = Duration::from_secs(2);
const RECONNECT_BACKOFF: Duration = Duration::from_secs(1);

/// Identifies and authenticates the principal a [`BrokerClient`] connects
/// as.
#[derive(Debug, Clone)]
pub struct BrokerOptions {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub username: String,
    pub password: String,
}

type Handlers = Arc<Mutex<HashMap<String, Arc<dyn MessageHandler>>>>;

/// Wraps a `rumqttc::AsyncClient` plus its driving event loop. Per-topic
/// handlers registered via [`BrokerClient::subscribe`] are invoked from
/// the event loop's background task for every matching publish.
pub struct BrokerClient {
    client: AsyncClient,
    handlers: Handlers,
}

impl BrokerClient {
    /// Connects to the broker with infinite retry and a 1s back-off
    /// between attempts, logging each attempt. Blocks (awaits) until the
    /// first `ConnAck` is received before returning, matching the
    /// supervisor's "construction blocks" contract.
    pub async fn connect(options: BrokerOptions) -> Self {
        let mut mqtt_options = MqttOptions::new(options.client_id.clone(), options.host.clone(), options.port);
        mqtt_options.set_keep_alive(KEEPALIVE);
        mqtt_options.set_credentials(options.username.clone(), options.password.clone());

        let (client, mut event_loop) = AsyncClient::new(mqtt_options, 64);
        let handlers: Handlers = Arc::new(Mutex::new(HashMap::new()));

        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!(host = %options.host, port = options.port, client_id = %options.client_id, "connected to broker");
                    break;
                }
                Ok(_) => continue,
                Err(e) => {
                    warn!(error = %e, host = %options.host, port = options.port, "broker connection attempt failed, retrying in 1s");
                    tokio::time::sleep(RECONNECT_BACKOFF).await;
                }
            }
        }

        let event_loop_handlers = handlers.clone();
        tokio::spawn(async move {
            loop {
                match event_loop.poll().await {
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        let handler = event_loop_handlers.lock().await.get(publish.topic.as_str()).cloned();
                        if let Some(handler) = handler {
                            handler.handle(&publish.topic, publish.payload.to_vec()).await;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "broker event loop error, retrying in 1s");
                        tokio::time::sleep(RECONNECT_BACKOFF).await;
                    }
                }
            }
        });

        BrokerClient { client, handlers }
    }

    /// Registers `handler` for every publish on `topic` and tells the
    /// broker to subscribe. `handler` is invoked from the event loop's
    /// background task, in broker-delivery order, for every message on
    /// that exact topic.
    pub async fn subscribe(
        &self,
        topic: impl Into<String>,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<(), BrokerError> {
        let topic = topic.into();
        self.client.subscribe(&topic, QoS::AtMostOnce).await?;
        self.handlers.lock().await.insert(topic, handler);
        Ok(())
    }

    /// Publishes `payload` to `topic` at QoS 0 (at-most-once,
    /// fire-and-forget). No retry is attempted by this layer.
    pub async fn publish(&self, topic: impl Into<String>, payload: Vec<u8>) -> Result<(), BrokerError> {
        self.client.publish(topic.into(), QoS::AtMostOnce, false, payload).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Publisher for BrokerClient {
    async fn publish(&self, topic: String, payload: Vec<u8>) -> Result<(), BrokerError> {
        BrokerClient::publish(self, topic, payload).await
    }
}
