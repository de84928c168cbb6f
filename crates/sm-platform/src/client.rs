//! Typed REST client for the CIMI inventory API and the lifecycle
//! manager, behind an object-safe [`PlatformClient`] trait so the
//! control loop can be tested against an in-memory double.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sm_types::{CimiIdentifier, DriverSpec, SensorDescriptor};

use crate::compose::render_compose;
use crate::config::PlatformClientConfig;
use crate::error::PlatformError;
use crate::models::{
    CimiDeviceDynamicList, CimiHref, CimiServiceCreationRequest, CimiServiceInstanceList,
    CimiServiceList, CimiSlaTemplateCreationRequest, CimiSlaTemplateList, CimiUserCreationRequest,
    CimiUserList, LifecycleServiceStartRequest, SlaTemplateDetails, SlaTemplateGuarantee,
    SlaTemplateParty, UserTemplate,
};
pub use crate::models::{CimiService, CimiServiceInstance, CimiSlaTemplate, CimiUser};

const SENSOR_MANAGER_SLA_PROVIDER_ID: &str = "mf2c";
const SENSOR_MANAGER_SLA_PROVIDER_NAME: &str = "mF2C Platform";
const SENSOR_MANAGER_SLA_CLIENT_ID: &str = "c02";
const SENSOR_MANAGER_SLA_CLIENT_NAME: &str = "clint";
const SLA_VALIDITY_DAYS: i64 = 100 * 365;

/// Placeholder `agreement_id`. No real agreement concept exists upstream
/// yet; the lifecycle manager accepts this literal string in its place.
const LIFECYCLE_AGREEMENT_PLACEHOLDER: &str = "this-is-not-needed-yet-right?";

#[async_trait::async_trait]
pub trait PlatformClient: Send + Sync {
    async fn list_users(&self) -> Result<Vec<CimiUser>, PlatformError>;
    async fn create_user(&self, username: &str, password: &str) -> Result<(), PlatformError>;
    async fn list_sla_templates(&self) -> Result<Vec<CimiSlaTemplate>, PlatformError>;
    async fn create_sla_template(&self, name: &str) -> Result<(), PlatformError>;
    async fn list_services(&self) -> Result<Vec<CimiService>, PlatformError>;
    async fn create_service(
        &self,
        spec: &DriverSpec,
        sla: &CimiSlaTemplate,
    ) -> Result<(), PlatformError>;
    async fn list_service_instances(&self) -> Result<Vec<CimiServiceInstance>, PlatformError>;
    async fn start_service(
        &self,
        user: &CimiUser,
        service: &CimiService,
    ) -> Result<(), PlatformError>;
    async fn list_device_dynamics(&self) -> Result<Vec<SensorDescriptor>, PlatformError>;
}

/// The real, `reqwest`-backed [`PlatformClient`]. CIMI and the lifecycle
/// manager are reached as two distinct REST surfaces, each with its own
/// host/port/protocol/headers.
pub struct HttpPlatformClient {
    cimi: PlatformClientConfig,
    lifecycle: PlatformClientConfig,
    cimi_http: reqwest::Client,
    lifecycle_http: reqwest::Client,
}

impl HttpPlatformClient {
    pub fn new(cimi: PlatformClientConfig, lifecycle: PlatformClientConfig) -> Self {
        let cimi_http = reqwest::Client::builder()
            .danger_accept_invalid_certs(cimi.insecure_tls)
            .build()
            .expect("failed to build CIMI HTTP client");
        let lifecycle_http = reqwest::Client::builder()
            .danger_accept_invalid_certs(lifecycle.insecure_tls)
            .build()
            .expect("failed to build lifecycle HTTP client");
        Self {
            cimi,
            lifecycle,
            cimi_http,
            lifecycle_http,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        http: &reqwest::Client,
        cfg: &PlatformClientConfig,
        endpoint: &str,
    ) -> Result<T, PlatformError> {
        let url = cfg.url(endpoint);
        let mut req = http.get(&url);
        for (name, value) in &cfg.headers {
            req = req.header(name, value);
        }
        let response = req.send().await.map_err(|source| PlatformError::Network {
            method: "GET".to_string(),
            endpoint: endpoint.to_string(),
            source,
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|source| PlatformError::Network {
            method: "GET".to_string(),
            endpoint: endpoint.to_string(),
            source,
        })?;
        if !status.is_success() {
            return Err(PlatformError::Upstream {
                method: "GET".to_string(),
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|source| PlatformError::Parse {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    async fn post_json<B: Serialize + Sync>(
        &self,
        http: &reqwest::Client,
        cfg: &PlatformClientConfig,
        endpoint: &str,
        body: &B,
    ) -> Result<(), PlatformError> {
        let url = cfg.url(endpoint);
        let mut req = http.post(&url).json(body);
        for (name, value) in &cfg.headers {
            req = req.header(name, value);
        }
        let response = req.send().await.map_err(|source| PlatformError::Network {
            method: "POST".to_string(),
            endpoint: endpoint.to_string(),
            source,
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Upstream {
                method: "POST".to_string(),
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PlatformClient for HttpPlatformClient {
    async fn list_users(&self) -> Result<Vec<CimiUser>, PlatformError> {
        let list: CimiUserList = self.get_json(&self.cimi_http, &self.cimi, "/api/user").await?;
        Ok(list.users)
    }

    async fn create_user(&self, username: &str, password: &str) -> Result<(), PlatformError> {
        let request = CimiUserCreationRequest {
            user_template: UserTemplate {
                href: "user-template/self-registration".to_string(),
                username: username.to_string(),
                password: password.to_string(),
                password_repeat: password.to_string(),
                email_address: format!("{username}@example.com"),
            },
        };
        self.post_json(&self.cimi_http, &self.cimi, "/api/user", &request).await
    }

    async fn list_sla_templates(&self) -> Result<Vec<CimiSlaTemplate>, PlatformError> {
        let list: CimiSlaTemplateList = self
            .get_json(&self.cimi_http, &self.cimi, "/api/sla-template")
            .await?;
        Ok(list.templates)
    }

    async fn create_sla_template(&self, name: &str) -> Result<(), PlatformError> {
        let now = Utc::now();
        let expiration = now + chrono::Duration::days(SLA_VALIDITY_DAYS);
        let request = CimiSlaTemplateCreationRequest {
            name: name.to_string(),
            state: "started".to_string(),
            details: SlaTemplateDetails {
                kind: "template".to_string(),
                name: name.to_string(),
                provider: SlaTemplateParty {
                    id: SENSOR_MANAGER_SLA_PROVIDER_ID.to_string(),
                    name: SENSOR_MANAGER_SLA_PROVIDER_NAME.to_string(),
                },
                client: SlaTemplateParty {
                    id: SENSOR_MANAGER_SLA_CLIENT_ID.to_string(),
                    name: SENSOR_MANAGER_SLA_CLIENT_NAME.to_string(),
                },
                creation: now.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true),
                expiration: expiration.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true),
                guarantees: vec![SlaTemplateGuarantee {
                    name: "TestGuarantee".to_string(),
                    constraint: "execution_time < 1234567890".to_string(),
                }],
            },
        };
        self.post_json(&self.cimi_http, &self.cimi, "/api/sla-template", &request).await
    }

    async fn list_services(&self) -> Result<Vec<CimiService>, PlatformError> {
        let list: CimiServiceList = self
            .get_json(&self.cimi_http, &self.cimi, "/api/service")
            .await?;
        Ok(list.services)
    }

    async fn create_service(
        &self,
        spec: &DriverSpec,
        sla: &CimiSlaTemplate,
    ) -> Result<(), PlatformError> {
        let compose = render_compose(spec);
        let request = CimiServiceCreationRequest {
            name: spec.cimi_service_name(),
            exec: format!("data:application/x-yaml,{compose}"),
            exec_type: "docker-compose".to_string(),
            agent_type: "normal".to_string(),
            num_agents: 1,
            sla_templates: vec![CimiHref {
                href: sla.id.as_str().to_string(),
            }],
        };
        self.post_json(&self.cimi_http, &self.cimi, "/api/service", &request).await
    }

    async fn list_service_instances(&self) -> Result<Vec<CimiServiceInstance>, PlatformError> {
        let list: CimiServiceInstanceList = self
            .get_json(&self.cimi_http, &self.cimi, "/api/service-instance")
            .await?;
        Ok(list.service_instances)
    }

    async fn start_service(
        &self,
        user: &CimiUser,
        service: &CimiService,
    ) -> Result<(), PlatformError> {
        let request = LifecycleServiceStartRequest {
            service_id: service.id.clone(),
            user_id: user.id.clone(),
            agreement_id: LIFECYCLE_AGREEMENT_PLACEHOLDER.to_string(),
        };
        self.post_json(&self.lifecycle_http, &self.lifecycle, "/api/v2/lm/service", &request)
            .await
    }

    async fn list_device_dynamics(&self) -> Result<Vec<SensorDescriptor>, PlatformError> {
        let list: CimiDeviceDynamicList = self
            .get_json(&self.cimi_http, &self.cimi, "/api/device-dynamic")
            .await?;

        if list.device_dynamics.len() != 1 {
            return Err(PlatformError::UnexpectedTopology {
                count: list.device_dynamics.len(),
            });
        }
        let device = &list.device_dynamics[0];

        device
            .sensors
            .iter()
            .map(|sensor| {
                let dimensions: Vec<String> =
                    serde_json::from_str(&sensor.sensor_type).map_err(|source| PlatformError::Parse {
                        endpoint: "/api/device-dynamic#sensorType".to_string(),
                        source,
                    })?;
                let connection_parameters: serde_json::Map<String, serde_json::Value> =
                    serde_json::from_str(&sensor.sensor_connection).map_err(|source| PlatformError::Parse {
                        endpoint: "/api/device-dynamic#sensorConnection".to_string(),
                        source,
                    })?;
                Ok(SensorDescriptor {
                    hardware_model: sensor.sensor_model.clone(),
                    dimensions,
                    connection_parameters,
                })
            })
            .collect()
    }
}

/// `"type/uuid"`-style lookup helper: finds the first item whose
/// `key(item)` equals `needle`, the way every "ensure X exists" step
/// does its list-then-filter.
pub fn find_by<'a, T>(items: &'a [T], key: impl Fn(&T) -> &str, needle: &str) -> Option<&'a T> {
    items.iter().find(|item| key(item) == needle)
}

pub fn identifier_href(id: &CimiIdentifier) -> String {
    id.as_str().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_by_matches_on_key() {
        let items = vec!["alice".to_string(), "bob".to_string()];
        assert_eq!(find_by(&items, |s| s.as_str(), "bob"), Some(&"bob".to_string()));
        assert_eq!(find_by(&items, |s| s.as_str(), "carol"), None);
    }

    #[test]
    fn identifier_href_roundtrips_the_raw_string() {
        let id = CimiIdentifier::new("service/abc-123");
        assert_eq!(identifier_href(&id), "service/abc-123");
    }
}
