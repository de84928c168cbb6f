use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("network error calling {method} {endpoint}: {source}")]
    Network {
        method: String,
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("upstream {method} {endpoint} returned {status}: {body}")]
    Upstream {
        method: String,
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("failed to parse response from {endpoint}: {source}")]
    Parse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected exactly one device-dynamic resource, got {count}")]
    UnexpectedTopology { count: usize },
}
