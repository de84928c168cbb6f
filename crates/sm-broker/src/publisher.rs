use crate::error::BrokerError;

/// The outbound half of a broker session, split out as its own trait so
/// that callers which only publish (the pipeline's republish step, the
/// `--simulate-sensor` mode) can be tested against an in-memory double
/// instead of a live broker.
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, topic: String, payload: Vec<u8>) -> Result<(), BrokerError>;
}
