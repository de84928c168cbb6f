//! `sm-cli` – the sensor-manager control plane's process supervisor.
//!
//! Loads configuration from the environment, then either runs the
//! `--simulate-sensor` test-mode driver, or starts the auth oracle, the
//! transformation pipeline and the control loop and waits for all three.

mod config;
mod simulate;
mod supervisor;

use clap::Parser;

/// The sensor-manager control plane: auth oracle, transformation
/// pipeline, and sensor-to-driver reconciliation loop.
#[derive(Parser, Debug)]
#[command(name = "sensor-manager", version, about)]
struct Args {
    /// Connect as the sensor-driver principal and publish a synthetic
    /// reading to the ingest topic once a second, indefinitely, instead
    /// of running the real service.
    #[arg(long)]
    simulate_sensor: bool,
}

fn init_tracing() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("SM_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    println!("sensor-manager v{} — IoT sensor-ingestion control plane", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let cfg = config::load();

    if args.simulate_sensor {
        simulate::run(&cfg).await;
    } else {
        supervisor::run(cfg).await;
    }
}
