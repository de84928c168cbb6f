//! The persisted credential store — the auth oracle's and transformation
//! pipeline's only piece of mutable shared state.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sm_types::topic::{Access, INGEST_TOPIC, PUBLISH_ROOT, SENSOR_DRIVER_USERNAME, SYSTEM_USERNAME};
use sm_types::{sanitize, SensorTopic};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::secret::{generate_secret, Secret};

/// On-disk shape of the credential database. Field names are preserved
/// exactly (PascalCase) for backward compatibility with existing store
/// files.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStore {
    #[serde(rename = "Filename")]
    filename: String,
    #[serde(rename = "Topics")]
    topics: HashMap<String, SensorTopic>,
    #[serde(rename = "AdministratorAccessToken")]
    administrator_access_token: String,
    #[serde(rename = "SensorDriverAccessToken")]
    sensor_driver_access_token: String,
}

/// In-memory state guarded by the store's mutex.
struct StoreState {
    filename: String,
    topics: HashMap<String, SensorTopic>,
    administrator_access_token: Secret,
    sensor_driver_access_token: Secret,
}

impl StoreState {
    fn to_persisted(&self) -> PersistedStore {
        PersistedStore {
            filename: self.filename.clone(),
            topics: self.topics.clone(),
            administrator_access_token: self.administrator_access_token.expose().to_string(),
            sensor_driver_access_token: self.sensor_driver_access_token.expose().to_string(),
        }
    }
}

/// The persisted `sensor-id -> (topic, username, password)` credential
/// database, plus the two process-wide privileged tokens. All mutations
/// serialize through the internal lock and persist synchronously before
/// the mutating call returns, so a reader that observes a successful
/// `add_sensor` always sees the same state on disk.
pub struct CredentialStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl CredentialStore {
    /// Loads the store from `path`, creating an empty one if it does not
    /// exist. Either way, `admin_token` and `driver_token` overwrite
    /// whatever was persisted and the file is rewritten before returning.
    ///
    /// A file that exists but fails to parse is `StoreError::Corrupt` —
    /// the caller must treat this as fatal and refuse to start.
    pub async fn load_or_create(
        path: impl Into<PathBuf>,
        admin_token: impl Into<String>,
        driver_token: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    tokio::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o776))
                        .await?;
                }
            }
        }

        let loaded = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let persisted: PersistedStore = serde_json::from_slice(&bytes)
                    .map_err(|e| StoreError::Corrupt(e.to_string()))?;
                info!(path = %path.display(), sensors = persisted.topics.len(), "loaded credential store");
                persisted
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no credential store on disk, starting empty");
                PersistedStore {
                    filename: path.display().to_string(),
                    topics: HashMap::new(),
                    administrator_access_token: String::new(),
                    sensor_driver_access_token: String::new(),
                }
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        let state = StoreState {
            filename: path.display().to_string(),
            topics: loaded.topics,
            administrator_access_token: Secret::new(admin_token.into()),
            sensor_driver_access_token: Secret::new(driver_token.into()),
        };

        let store = CredentialStore {
            path,
            state: Mutex::new(state),
        };
        store.persist_locked(&store.state.lock().await).await?;
        Ok(store)
    }

    /// Generates fresh credentials for a previously unseen `sensor_id`,
    /// inserts the record, and atomically persists the store. Returns
    /// `StoreError::AlreadyExists` without mutating anything if the
    /// `sensor_id` is already present.
    pub async fn add_sensor(&self, sensor_id: &str, quantity: &str) -> Result<String, StoreError> {
        let mut state = self.state.lock().await;
        if state.topics.contains_key(sensor_id) {
            return Err(StoreError::AlreadyExists(sensor_id.to_string()));
        }

        let topic_name = format!("{}{}", PUBLISH_ROOT, sanitize(sensor_id));
        let username = generate_secret().expose().to_string();
        let password = generate_secret().expose().to_string();

        state.topics.insert(
            sensor_id.to_string(),
            SensorTopic {
                sensor_id: sensor_id.to_string(),
                name: topic_name.clone(),
                quantity: quantity.to_string(),
                username,
                password,
            },
        );

        self.persist_locked(&state).await?;
        debug!(sensor_id, topic = %topic_name, "provisioned new sensor topic and credentials");
        Ok(topic_name)
    }

    /// Returns the outbound topic for a known sensor, or `NotFound`.
    pub async fn topic_for(&self, sensor_id: &str) -> Result<String, StoreError> {
        let state = self.state.lock().await;
        state
            .topics
            .get(sensor_id)
            .map(|t| t.name.clone())
            .ok_or_else(|| StoreError::NotFound(sensor_id.to_string()))
    }

    /// True iff `(username, password)` matches the administrator pair,
    /// the sensor-driver pair, or a provisioned per-sensor pair. Every
    /// comparison is constant-time over the raw bytes.
    pub async fn is_authenticated(&self, username: &str, password: &str) -> bool {
        let state = self.state.lock().await;

        if username == SYSTEM_USERNAME && state.administrator_access_token.matches(password) {
            return true;
        }
        if username == SENSOR_DRIVER_USERNAME && state.sensor_driver_access_token.matches(password)
        {
            return true;
        }
        state.topics.values().any(|t| {
            Secret::new(t.username.clone()).matches(username)
                && Secret::new(t.password.clone()).matches(password)
        })
    }

    /// True iff one of the three ACL clauses in the design holds: `system`
    /// has full access; `sensor-driver` may publish to the ingest topic;
    /// or a per-sensor principal may subscribe to its own topic.
    pub async fn is_authorized(&self, username: &str, topic: &str, access: Option<Access>) -> bool {
        if username == SYSTEM_USERNAME {
            return true;
        }
        if username == SENSOR_DRIVER_USERNAME {
            return topic == INGEST_TOPIC && access == Some(Access::Publish);
        }
        if access != Some(Access::Subscribe) {
            return false;
        }
        let state = self.state.lock().await;
        state
            .topics
            .values()
            .any(|t| t.username == username && t.name == topic)
    }

    /// True iff `username` is one of the two principals the broker is
    /// allowed to treat as superuser once the password has already been
    /// validated via `is_authenticated`.
    pub fn is_superuser_preauth(&self, username: &str) -> bool {
        username == SYSTEM_USERNAME || username == SENSOR_DRIVER_USERNAME
    }

    async fn persist_locked(&self, state: &StoreState) -> Result<(), StoreError> {
        let persisted = state.to_persisted();
        let bytes = serde_json::to_vec_pretty(&persisted)?;

        let tmp_path = PathBuf::from(format!("{}.tmp-{}", self.path.display(), uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp_path, &bytes).await.inspect_err(|_| {
            warn!(path = %tmp_path.display(), "failed to write temp credential file");
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o660)).await?;
        }

        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn fresh_store(dir: &std::path::Path) -> CredentialStore {
        let path = dir.join("auth.json");
        CredentialStore::load_or_create(path, "admin-token", "driver-token")
            .await
            .expect("load_or_create")
    }

    #[tokio::test]
    async fn fresh_start_persists_empty_store_and_authenticates_fixed_principals() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(dir.path()).await;

        assert!(store.is_authenticated("system", "admin-token").await);
        assert!(store.is_authenticated("sensor-driver", "driver-token").await);
        assert!(!store.is_authenticated("x", "admin-token").await);
        assert!(!store.is_authenticated("system", "wrong").await);

        assert!(dir.path().join("auth.json").exists());
    }

    #[tokio::test]
    async fn add_sensor_then_topic_for_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(dir.path()).await;

        let topic = store.add_sensor("s1", "temperature").await.unwrap();
        assert_eq!(topic, "/sensor-manager/values/s1");
        assert_eq!(store.topic_for("s1").await.unwrap(), topic);
    }

    #[tokio::test]
    async fn add_sensor_sanitizes_the_topic_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(dir.path()).await;

        let topic = store.add_sensor("a/b c", "temperature").await.unwrap();
        assert_eq!(topic, "/sensor-manager/values/a_b_c");
    }

    #[tokio::test]
    async fn add_sensor_twice_is_already_exists() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(dir.path()).await;

        store.add_sensor("s1", "temperature").await.unwrap();
        let err = store.add_sensor("s1", "humidity").await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(ref s) if s == "s1"));
    }

    #[tokio::test]
    async fn topic_for_unknown_sensor_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(dir.path()).await;
        assert!(matches!(store.topic_for("nope").await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn acl_subscribe_grant_for_provisioned_sensor() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(dir.path()).await;
        let topic = store.add_sensor("s1", "temperature").await.unwrap();
        let username = store.topic_for("s1").await.map(|_| ()).unwrap();
        let _ = username;

        // Recover the generated username the way the oracle would see it:
        // by reading the persisted file back.
        let raw = tokio::fs::read_to_string(dir.path().join("auth.json")).await.unwrap();
        let persisted: PersistedStore = serde_json::from_str(&raw).unwrap();
        let sensor_username = persisted.topics["s1"].username.clone();

        assert!(store.is_authorized(&sensor_username, &topic, Some(Access::Subscribe)).await);
        assert!(!store.is_authorized(&sensor_username, &topic, Some(Access::Publish)).await);
    }

    #[tokio::test]
    async fn system_is_authorized_purely_via_its_own_clause() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(dir.path()).await;
        assert!(store.is_authorized("system", "/not/a/provisioned/topic", Some(Access::Subscribe)).await);
        assert!(store.is_authorized("system", "/not/a/provisioned/topic", None).await);
        assert!(!store.is_authorized("not-system", "/not/a/provisioned/topic", Some(Access::Subscribe)).await);
    }

    #[tokio::test]
    async fn sensor_driver_may_only_publish_to_ingest_topic() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(dir.path()).await;
        assert!(store.is_authorized("sensor-driver", INGEST_TOPIC, Some(Access::Publish)).await);
        assert!(!store.is_authorized("sensor-driver", INGEST_TOPIC, Some(Access::Subscribe)).await);
        assert!(!store.is_authorized("sensor-driver", "/sensor-manager/values/x", Some(Access::Publish)).await);
    }

    #[tokio::test]
    async fn unauthenticated_credentials_are_always_false() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(dir.path()).await;
        store.add_sensor("s1", "temperature").await.unwrap();
        assert!(!store.is_authenticated("ghost", "ghost").await);
    }

    #[tokio::test]
    async fn is_superuser_preauth_matches_only_the_two_fixed_principals() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(dir.path()).await;
        assert!(store.is_superuser_preauth("system"));
        assert!(store.is_superuser_preauth("sensor-driver"));
        assert!(!store.is_superuser_preauth("some-sensor-user"));
    }

    #[tokio::test]
    async fn reload_overwrites_persisted_tokens_with_fresh_ones() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        {
            let store = CredentialStore::load_or_create(&path, "old-admin", "old-driver")
                .await
                .unwrap();
            store.add_sensor("s1", "temperature").await.unwrap();
        }

        let reloaded = CredentialStore::load_or_create(&path, "new-admin", "new-driver")
            .await
            .unwrap();
        assert!(reloaded.is_authenticated("system", "new-admin").await);
        assert!(!reloaded.is_authenticated("system", "old-admin").await);
        assert_eq!(reloaded.topic_for("s1").await.unwrap(), "/sensor-manager/values/s1");
    }

    #[tokio::test]
    async fn corrupt_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let err = CredentialStore::load_or_create(&path, "a", "d").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }
}
