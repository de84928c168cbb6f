use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// A credential value (a token or a generated password) that zeroizes its
/// backing buffer on drop and never prints its contents via `Debug`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Constant-time equality against a plaintext candidate, so a
    /// wrong-guess timing does not leak how many leading bytes matched.
    /// Lengths are compared first; that is considered non-secret (it
    /// reveals nothing about content) and keeps the comparison itself
    /// simple rather than padding to a fixed width.
    pub fn matches(&self, candidate: &str) -> bool {
        let a = self.0.as_bytes();
        let b = candidate.as_bytes();
        if a.len() != b.len() {
            return false;
        }
        a.ct_eq(b).into()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}
impl Eq for Secret {}

/// 32 random bytes from a CSPRNG, base64-encoded.
pub fn generate_secret() -> Secret {
    use base64::Engine;
    use rand::RngCore;

    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    Secret::new(base64::engine::general_purpose::STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_equal_value() {
        let s = Secret::new("hunter2");
        assert!(s.matches("hunter2"));
    }

    #[test]
    fn rejects_different_value() {
        let s = Secret::new("hunter2");
        assert!(!s.matches("hunter3"));
        assert!(!s.matches("hunter2x"));
        assert!(!s.matches(""));
    }

    #[test]
    fn debug_never_exposes_value() {
        let s = Secret::new("topsecret");
        let rendered = format!("{:?}", s);
        assert!(!rendered.contains("topsecret"));
    }

    #[test]
    fn generated_secrets_are_32_bytes_of_entropy() {
        use base64::Engine;
        let a = generate_secret();
        let b = generate_secret();
        assert_ne!(a.expose(), b.expose());
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(a.expose())
            .unwrap();
        assert_eq!(decoded.len(), 32);
    }
}
