use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker client error: {0}")]
    Client(#[from] rumqttc::ClientError),
}
