//! The reconciliation state machine:
//!
//! ```text
//!   Init -> EnsureUser -> EnsureSla -> Poll -> ReconcileSensors -> Sleep -> Poll
//!                 ^                                  |
//!                 └──────── transient error ─────────┘
//! ```
//!
//! `EnsureUser`/`EnsureSla` retry forever on a fixed 1s back-off —
//! identity bootstrap is never gated by the poll interval. `Poll` and
//! `ReconcileSensors` are gated by `check_interval` instead: a failure
//! there is logged and the loop simply waits for the next tick.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sm_platform::{find_by, CimiService, CimiServiceInstance, CimiSlaTemplate, CimiUser, PlatformClient};
use sm_types::SensorDescriptor;
use tracing::{error, info, warn};

use crate::driver_spec::{driver_spec_for_sensor, DriverEnvironmentContext};
use crate::known_sensors::KnownSensors;

pub const CIMI_USERNAME: &str = "sensor-manager-user";
pub const CIMI_PASSWORD: &str = "sensor-manager-password";
pub const CIMI_SLA_TEMPLATE_NAME: &str = "sensor-manager-sla";

const ENSURE_BACKOFF: Duration = Duration::from_secs(1);

/// Everything the control loop needs beyond the [`PlatformClient`] itself.
#[derive(Debug, Clone)]
pub struct ControlLoopConfig {
    pub check_interval: Duration,
    pub sensor_container_map_path: PathBuf,
    pub driver_environment: DriverEnvironmentContext,
}

/// Owns the loop's process-local state: the platform identity
/// bootstrapped once at startup, and the [`KnownSensors`] memory that is
/// never persisted.
pub struct ControlLoop {
    platform: Arc<dyn PlatformClient>,
    config: ControlLoopConfig,
    known: KnownSensors,
    user: CimiUser,
    sla: CimiSlaTemplate,
}

impl ControlLoop {
    /// Runs `EnsureUser` then `EnsureSla`, retrying each forever on a
    /// fixed 1s back-off, before returning a loop ready to poll.
    pub async fn bootstrap(platform: Arc<dyn PlatformClient>, config: ControlLoopConfig) -> Self {
        let user = ensure_user(platform.as_ref()).await;
        let sla = ensure_sla(platform.as_ref()).await;
        ControlLoop {
            platform,
            config,
            known: KnownSensors::new(),
            user,
            sla,
        }
    }

    pub fn known_sensors(&self) -> &KnownSensors {
        &self.known
    }

    /// One `Poll` + `ReconcileSensors` step. On a poll failure, logs and
    /// returns without touching `KnownSensors` — the caller still sleeps
    /// one `check_interval` before trying again.
    pub async fn poll_and_reconcile(&mut self) {
        match self.platform.list_device_dynamics().await {
            Ok(sensors) => self.reconcile(&sensors).await,
            Err(e) => warn!(error = %e, "polling device dynamics failed, retrying next interval"),
        }
    }

    async fn reconcile(&mut self, sensors: &[SensorDescriptor]) {
        for sensor in sensors {
            if self.known.is_known(&sensor.hardware_model) {
                continue;
            }
            // Marked known *before* the remaining steps are attempted:
            // a failure below will not be retried on a later tick. This
            // this is intentional: a sensor observed once is never
            // retried on a later tick, even if reconciliation fails.
            self.known.mark_known(sensor.clone());
            info!(hardware_model = %sensor.hardware_model, "observed a new sensor, reconciling its driver container");

            if let Err(e) = self.reconcile_one(sensor).await {
                error!(hardware_model = %sensor.hardware_model, error = %e, "failed to reconcile sensor, will not retry");
            }
        }
    }

    async fn reconcile_one(&self, sensor: &SensorDescriptor) -> Result<(), ReconcileError> {
        let spec = driver_spec_for_sensor(
            &self.config.sensor_container_map_path,
            sensor,
            &self.config.driver_environment,
        )?;

        info!(hardware_model = %sensor.hardware_model, "ensuring the driver service exists");
        let service = ensure_service(self.platform.as_ref(), &spec, &self.sla).await?;

        info!(hardware_model = %sensor.hardware_model, service = %service.name, "ensuring the driver service instance exists");
        ensure_service_instance(self.platform.as_ref(), &self.user, &service).await?;

        Ok(())
    }

    /// Drives `Poll -> ReconcileSensors -> Sleep` forever. Does not
    /// return under normal operation.
    pub async fn run(mut self) {
        loop {
            self.poll_and_reconcile().await;
            tokio::time::sleep(self.config.check_interval).await;
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum ReconcileError {
    #[error(transparent)]
    Mapping(#[from] crate::driver_spec::MappingError),
    #[error(transparent)]
    Platform(#[from] sm_platform::PlatformError),
}

async fn ensure_user(platform: &dyn PlatformClient) -> CimiUser {
    loop {
        match platform.list_users().await {
            Ok(users) => {
                if let Some(user) = find_by(&users, |u| u.username.as_str(), CIMI_USERNAME) {
                    return user.clone();
                }
                info!(username = CIMI_USERNAME, "CIMI user does not exist, creating");
                if let Err(e) = platform.create_user(CIMI_USERNAME, CIMI_PASSWORD).await {
                    warn!(error = %e, "failed to create CIMI user, retrying in 1s");
                    tokio::time::sleep(ENSURE_BACKOFF).await;
                    continue;
                }
                match platform.list_users().await {
                    Ok(users) => match find_by(&users, |u| u.username.as_str(), CIMI_USERNAME) {
                        Some(user) => return user.clone(),
                        None => {
                            warn!("created CIMI user but it was not present on re-list, retrying in 1s");
                            tokio::time::sleep(ENSURE_BACKOFF).await;
                        }
                    },
                    Err(e) => {
                        warn!(error = %e, "failed to re-list CIMI users, retrying in 1s");
                        tokio::time::sleep(ENSURE_BACKOFF).await;
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to list CIMI users, retrying in 1s");
                tokio::time::sleep(ENSURE_BACKOFF).await;
            }
        }
    }
}

async fn ensure_sla(platform: &dyn PlatformClient) -> CimiSlaTemplate {
    loop {
        match platform.list_sla_templates().await {
            Ok(templates) => {
                if let Some(t) = find_by(&templates, |t| t.name.as_str(), CIMI_SLA_TEMPLATE_NAME) {
                    return t.clone();
                }
                info!(name = CIMI_SLA_TEMPLATE_NAME, "SLA template does not exist, creating");
                if let Err(e) = platform.create_sla_template(CIMI_SLA_TEMPLATE_NAME).await {
                    warn!(error = %e, "failed to create SLA template, retrying in 1s");
                    tokio::time::sleep(ENSURE_BACKOFF).await;
                    continue;
                }
                match platform.list_sla_templates().await {
                    Ok(templates) => match find_by(&templates, |t| t.name.as_str(), CIMI_SLA_TEMPLATE_NAME) {
                        Some(t) => return t.clone(),
                        None => {
                            warn!("created SLA template but it was not present on re-list, retrying in 1s");
                            tokio::time::sleep(ENSURE_BACKOFF).await;
                        }
                    },
                    Err(e) => {
                        warn!(error = %e, "failed to re-list SLA templates, retrying in 1s");
                        tokio::time::sleep(ENSURE_BACKOFF).await;
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to list SLA templates, retrying in 1s");
                tokio::time::sleep(ENSURE_BACKOFF).await;
            }
        }
    }
}

async fn ensure_service(
    platform: &dyn PlatformClient,
    spec: &sm_types::DriverSpec,
    sla: &CimiSlaTemplate,
) -> Result<CimiService, sm_platform::PlatformError> {
    let name = spec.cimi_service_name();
    let services = platform.list_services().await?;
    if let Some(service) = find_by(&services, |s| s.name.as_str(), &name) {
        return Ok(service.clone());
    }
    platform.create_service(spec, sla).await?;
    let services = platform.list_services().await?;
    find_by(&services, |s| s.name.as_str(), &name)
        .cloned()
        .ok_or_else(|| sm_platform::PlatformError::Upstream {
            method: "GET".to_string(),
            endpoint: "/api/service".to_string(),
            status: 0,
            body: format!("created service {name} but it was not present on re-list"),
        })
}

async fn ensure_service_instance(
    platform: &dyn PlatformClient,
    user: &CimiUser,
    service: &CimiService,
) -> Result<CimiServiceInstance, sm_platform::PlatformError> {
    let instances = platform.list_service_instances().await?;
    if let Some(instance) = instances.iter().find(|i| i.service == service.id) {
        return Ok(instance.clone());
    }
    platform.start_service(user, service).await?;
    let instances = platform.list_service_instances().await?;
    instances
        .into_iter()
        .find(|i| i.service == service.id)
        .ok_or_else(|| sm_platform::PlatformError::Upstream {
            method: "GET".to_string(),
            endpoint: "/api/service-instance".to_string(),
            status: 0,
            body: format!("started service instance for {} but it was not present on re-list", service.name),
        })
}

/// Bootstraps identity, then polls and reconciles forever. Entry point
/// for `sm-cli`.
pub async fn run(platform: Arc<dyn PlatformClient>, config: ControlLoopConfig) {
    let control_loop = ControlLoop::bootstrap(platform, config).await;
    control_loop.run().await;
}
