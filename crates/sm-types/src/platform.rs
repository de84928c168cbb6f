use serde::{Deserialize, Serialize};

/// A CIMI resource handle, carried on the wire as an opaque `"type/uuid"`
/// string and compared by equality everywhere it is used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CimiIdentifier(pub String);

impl CimiIdentifier {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The part before the first `/`, or the whole string if there is none.
    pub fn kind(&self) -> &str {
        match self.0.split_once('/') {
            Some((kind, _)) => kind,
            None => &self.0,
        }
    }

    /// The part after the first `/`, or the whole string if there is none.
    pub fn uuid(&self) -> &str {
        match self.0.split_once('/') {
            Some((_, uuid)) => uuid,
            None => &self.0,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CimiIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
