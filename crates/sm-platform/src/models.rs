//! Wire types for the CIMI inventory API and the lifecycle manager.
//! Only the fields this client reads or writes are modeled — CIMI
//! resources carry many more fields than these, and `serde` silently
//! ignores whatever we don't name.

use serde::{Deserialize, Serialize};
use sm_types::CimiIdentifier;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CimiUser {
    pub id: CimiIdentifier,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CimiUserList {
    pub users: Vec<CimiUser>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserTemplate {
    pub href: String,
    pub username: String,
    pub password: String,
    #[serde(rename = "passwordRepeat")]
    pub password_repeat: String,
    #[serde(rename = "emailAddress")]
    pub email_address: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CimiUserCreationRequest {
    #[serde(rename = "userTemplate")]
    pub user_template: UserTemplate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CimiSlaTemplate {
    pub id: CimiIdentifier,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CimiSlaTemplateList {
    pub templates: Vec<CimiSlaTemplate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SlaTemplateParty {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SlaTemplateGuarantee {
    pub name: String,
    pub constraint: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SlaTemplateDetails {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub provider: SlaTemplateParty,
    pub client: SlaTemplateParty,
    pub creation: String,
    pub expiration: String,
    pub guarantees: Vec<SlaTemplateGuarantee>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CimiSlaTemplateCreationRequest {
    pub name: String,
    pub state: String,
    pub details: SlaTemplateDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CimiService {
    pub id: CimiIdentifier,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CimiServiceList {
    pub services: Vec<CimiService>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CimiHref {
    pub href: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CimiServiceCreationRequest {
    pub name: String,
    pub exec: String,
    pub exec_type: String,
    pub agent_type: String,
    pub num_agents: u32,
    pub sla_templates: Vec<CimiHref>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CimiServiceInstance {
    pub id: CimiIdentifier,
    pub service: CimiIdentifier,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CimiServiceInstanceList {
    #[serde(rename = "serviceInstances")]
    pub service_instances: Vec<CimiServiceInstance>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LifecycleServiceStartRequest {
    pub service_id: CimiIdentifier,
    pub user_id: CimiIdentifier,
    pub agreement_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CimiDeviceDynamicList {
    #[serde(rename = "deviceDynamics")]
    pub device_dynamics: Vec<CimiDeviceDynamicWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CimiDeviceDynamicWire {
    pub sensors: Vec<CimiDeviceDynamicSensorWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CimiDeviceDynamicSensorWire {
    #[serde(rename = "sensorModel")]
    pub sensor_model: String,
    /// JSON-encoded `Vec<String>`, re-parsed by the caller.
    #[serde(rename = "sensorType")]
    pub sensor_type: String,
    /// JSON-encoded object, re-parsed by the caller.
    #[serde(rename = "sensorConnection")]
    pub sensor_connection: String,
}
