//! Topic naming and access-control primitives shared by the credential
//! store, the auth oracle and the transformation pipeline.

/// Root under which every per-sensor outbound topic is published.
pub const PUBLISH_ROOT: &str = "/sensor-manager/values/";

/// Topic sensor drivers publish raw readings to.
pub const INGEST_TOPIC: &str = "/sensor-manager/sensor-incoming";

/// The fixed principal names the auth oracle treats specially.
pub const SYSTEM_USERNAME: &str = "system";
pub const SENSOR_DRIVER_USERNAME: &str = "sensor-driver";

/// Broker ACL access kinds, as carried in the `acc` field of `/acl`
/// requests (`1` = subscribe, `2` = publish upstream).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Subscribe,
    Publish,
}

impl Access {
    /// Parses the broker's numeric access code. Anything other than `1`
    /// or `2` (including a missing/unparsed field) yields `None`, which
    /// callers must treat as "never authorized".
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Access::Subscribe),
            2 => Some(Access::Publish),
            _ => None,
        }
    }
}

/// Maps every byte outside `[0-9A-Za-z]` to `_`. Operates byte-wise:
/// this is equivalent to mapping rune-by-rune for any valid UTF-8 input
/// because every byte of a multi-byte UTF-8 sequence falls outside the
/// ASCII ranges kept untouched, so each such byte independently becomes
/// its own `_`.
pub fn sanitize(s: &str) -> String {
    s.bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() {
                b as char
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_alphanumerics() {
        assert_eq!(sanitize("abcXYZ019"), "abcXYZ019");
    }

    #[test]
    fn sanitize_replaces_everything_else() {
        assert_eq!(sanitize("a/b c-d"), "a_b_c_d");
    }

    #[test]
    fn sanitize_is_same_byte_length() {
        for s in ["", "a", "sensor/42", "  ", "héllo"] {
            assert_eq!(sanitize(s).len(), s.len());
        }
    }

    #[test]
    fn sanitize_only_emits_allowed_charset() {
        for s in ["sensor/42:room#7", "üöä", "already_ok"] {
            let out = sanitize(s);
            assert!(out.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_'));
        }
    }

    #[test]
    fn sanitize_is_idempotent() {
        for s in ["sensor/42:room#7", "already_ok", "ünïcode"] {
            let once = sanitize(s);
            let twice = sanitize(&once);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn access_from_code() {
        assert_eq!(Access::from_code(1), Some(Access::Subscribe));
        assert_eq!(Access::from_code(2), Some(Access::Publish));
        assert_eq!(Access::from_code(0), None);
        assert_eq!(Access::from_code(-1), None);
    }
}
