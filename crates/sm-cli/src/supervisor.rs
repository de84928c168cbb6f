//! Starts the auth oracle, the transformation pipeline and the control
//! loop concurrently once the credential store is loaded and the
//! `system`-authenticated broker session is connected, then waits for
//! all three. None of them return under normal operation; if any one
//! exits or panics, the error is logged and the process exits non-zero
//! (there is no graceful-shutdown contract — see the crate-level design
//! notes).

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sm_broker::{BrokerClient, BrokerOptions};
use sm_control::{ControlLoopConfig, DriverEnvironmentContext};
use sm_credentials::CredentialStore;
use sm_pipeline::IngestHandler;
use sm_platform::{
    HttpPlatformClient, PlatformClient, PlatformClientConfig, CIMI_AUTHENTICATION_BYPASS_VALUE,
    CIMI_AUTHENTICATION_HEADER_KEY,
};
use sm_types::topic::{INGEST_TOPIC, SYSTEM_USERNAME};
use tokio::task::JoinError;
use tracing::{error, info};

use crate::config::Config;

pub async fn run(config: Config) -> ! {
    let store = match CredentialStore::load_or_create(
        config.auth_db_file.clone(),
        config.administrator_access_token.clone(),
        config.sensor_driver_access_token.clone(),
    )
    .await
    {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!(error = %e, "failed to load credential store, refusing to start");
            std::process::exit(1);
        }
    };

    let broker = Arc::new(
        BrokerClient::connect(BrokerOptions {
            host: config.mqtt_host.clone(),
            port: config.mqtt_port,
            client_id: "sensor-manager".to_string(),
            username: SYSTEM_USERNAME.to_string(),
            password: config.administrator_access_token.clone(),
        })
        .await,
    );

    let ingest_handler = Arc::new(IngestHandler::new(store.clone(), broker.clone()));
    if let Err(e) = broker.subscribe(INGEST_TOPIC, ingest_handler).await {
        error!(error = %e, "failed to subscribe the transformation pipeline to the ingest topic");
        std::process::exit(1);
    }
    info!(topic = INGEST_TOPIC, "transformation pipeline subscribed");

    let oracle_addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let oracle_store = store.clone();
    let oracle_task = tokio::spawn(async move {
        if let Err(e) = sm_oracle::serve(oracle_addr, oracle_store).await {
            error!(error = %e, "auth oracle listener failed");
            std::process::exit(1);
        }
    });

    let platform: Arc<dyn PlatformClient> = Arc::new(HttpPlatformClient::new(
        PlatformClientConfig {
            host: config.cimi_host.clone(),
            port: config.cimi_port,
            protocol: "https".to_string(),
            headers: vec![(CIMI_AUTHENTICATION_HEADER_KEY.to_string(), CIMI_AUTHENTICATION_BYPASS_VALUE.to_string())],
            insecure_tls: true,
        },
        PlatformClientConfig {
            host: config.lifecycle_host.clone(),
            port: config.lifecycle_port,
            protocol: "http".to_string(),
            headers: vec![],
            insecure_tls: true,
        },
    ));

    let control_config = ControlLoopConfig {
        check_interval: Duration::from_secs(config.sensors_check_interval_seconds),
        sensor_container_map_path: config.sensor_container_map_file.clone(),
        driver_environment: DriverEnvironmentContext {
            mqtt_host: config.mqtt_host.clone(),
            mqtt_port: config.mqtt_port,
            mqtt_path_suffix: config.mqtt_path_suffix.clone(),
            sensor_driver_access_token: config.sensor_driver_access_token.clone(),
            sensor_driver_docker_network_name: config.sensor_driver_docker_network_name.clone(),
        },
    };
    let control_task = tokio::spawn(sm_control::run(platform, control_config));

    // The pipeline has no further blocking loop of its own: its callback
    // already runs from the broker client's background event-loop task.
    // Keep a task alive so the "wait for all three" contract below has
    // something to select on for this component too.
    let pipeline_task = tokio::spawn(std::future::pending::<()>());

    tokio::select! {
        res = oracle_task => exit_on_finish("auth oracle", res),
        res = control_task => exit_on_finish("control loop", res),
        res = pipeline_task => exit_on_finish("transformation pipeline", res),
    }
}

fn exit_on_finish(component: &str, res: Result<(), JoinError>) -> ! {
    match res {
        Ok(()) => error!(component, "task exited unexpectedly"),
        Err(e) => error!(component, error = %e, "task panicked"),
    }
    std::process::exit(1);
}
