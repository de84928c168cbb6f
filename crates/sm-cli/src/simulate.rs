//! `--simulate-sensor`: connects as the `sensor-driver` principal and
//! publishes a synthetic reading to the ingest topic once a second,
//! indefinitely. The test-mode counterpart to a real hardware driver.

use sm_broker::{BrokerClient, BrokerOptions};
use sm_types::topic::{INGEST_TOPIC, SENSOR_DRIVER_USERNAME};
use sm_types::IncomingSensorMessage;
use tracing::info;

use crate::config::Config;

const SIMULATED_SENSOR_ID: &str = "simulated-sensor-1";
const SIMULATED_SENSOR_TYPE: &str = "SIMULATED";
const SIMULATED_QUANTITY: &str = "temperature";
const SIMULATED_UNIT: &str = "C";

pub async fn run(config: &Config) -> ! {
    let broker = BrokerClient::connect(BrokerOptions {
        host: config.mqtt_host.clone(),
        port: config.mqtt_port,
        client_id: "sensor-manager-simulate-sensor".to_string(),
        username: SENSOR_DRIVER_USERNAME.to_string(),
        password: config.sensor_driver_access_token.clone(),
    })
    .await;

    info!("simulate-sensor: publishing a synthetic reading every second");
    let mut tick: u64 = 0;
    loop {
        let message = IncomingSensorMessage {
            sensor_id: SIMULATED_SENSOR_ID.to_string(),
            sensor_type: SIMULATED_SENSOR_TYPE.to_string(),
            quantity: SIMULATED_QUANTITY.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Nanos, true),
            value: 20.0 + (tick % 10) as f64,
            unit: SIMULATED_UNIT.to_string(),
        };
        tick += 1;

        match serde_json::to_vec(&message) {
            Ok(payload) => {
                if let Err(e) = broker.publish(INGEST_TOPIC, payload).await {
                    tracing::warn!(error = %e, "simulate-sensor: failed to publish reading");
                }
            }
            Err(e) => tracing::warn!(error = %e, "simulate-sensor: failed to serialize reading"),
        }

        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    }
}
