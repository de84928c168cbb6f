//! The pure, unit-tested heart of the pipeline: parsing, timestamp
//! validation, and the incoming-to-outgoing message shape change.

use chrono::DateTime;
use sm_types::{IncomingSensorMessage, OutgoingClientMessage};

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("malformed sensor message: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("timestamp {0:?} is not valid RFC3339")]
    InvalidTimestamp(String),
}

/// Parses a raw ingest payload and checks that its timestamp is valid
/// RFC3339 (accepting the nanosecond variant). Does not mutate or look
/// anything up; callers combine this with topic resolution separately.
pub fn parse_and_validate(payload: &[u8]) -> Result<IncomingSensorMessage, ValidationError> {
    let message: IncomingSensorMessage = serde_json::from_slice(payload)?;
    if DateTime::parse_from_rfc3339(&message.timestamp).is_err() {
        return Err(ValidationError::InvalidTimestamp(message.timestamp));
    }
    Ok(message)
}

/// Strips sensor identity fields, leaving only what a subscriber to a
/// specific sensor's own topic needs.
pub fn transform(incoming: IncomingSensorMessage) -> OutgoingClientMessage {
    incoming.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(timestamp: &str) -> Vec<u8> {
        format!(
            "{{\"SensorId\":\"sensor-1\",\"SensorType\":\"AM2302\",\"Quantity\":\"temperature\",\
             \"Timestamp\":\"{timestamp}\",\"Value\":21.5,\"Unit\":\"deg_c\"}}"
        )
        .into_bytes()
    }

    #[test]
    fn accepts_rfc3339_nano_timestamp() {
        let message = parse_and_validate(&payload("2024-01-01T00:00:00.123456789Z")).unwrap();
        assert_eq!(message.sensor_id, "sensor-1");
    }

    #[test]
    fn accepts_plain_rfc3339_timestamp() {
        parse_and_validate(&payload("2024-01-01T00:00:00Z")).unwrap();
    }

    #[test]
    fn rejects_non_rfc3339_timestamp() {
        let err = parse_and_validate(&payload("not-a-timestamp")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTimestamp(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_and_validate(b"not json").unwrap_err();
        assert!(matches!(err, ValidationError::MalformedJson(_)));
    }

    #[test]
    fn transform_strips_identity_fields_and_keeps_reading() {
        let message = parse_and_validate(&payload("2024-01-01T00:00:00Z")).unwrap();
        let outgoing = transform(message);
        assert_eq!(outgoing.value, 21.5);
        assert_eq!(outgoing.unit, "deg_c");
        assert_eq!(outgoing.timestamp, "2024-01-01T00:00:00Z");
    }
}
