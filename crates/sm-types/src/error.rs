use thiserror::Error;

/// Crate-wide error type. Component-local error enums convert into this
/// one at the boundary where they cross into the process supervisor.
#[derive(Debug, Error)]
pub enum SmError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("failed to parse: {0}")]
    ParseError(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("network error: {0}")]
    Network(String),

    #[error("upstream {method} {endpoint} returned {status}: {body}")]
    Upstream {
        method: String,
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("fatal invariant violated: {0}")]
    FatalInvariant(String),
}
