//! # irrigod — irrigation controller daemon
//!
//! Composition root that wires all adapters together and runs the controller.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct the board, the zone actuator and the MQTT client
//! - Spawn the scheduler, status reporter, heartbeat and inbound bridge
//! - Handle graceful shutdown (Ctrl-C): every output is turned off
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use irrigo_adapter_mqtt::{MqttNotificationSink, disconnect, heartbeat_loop, run_bridge};
use irrigo_adapter_storage_sqlite_sqlx::SqliteProgramStore;
use irrigo_adapter_virtual::VirtualBoard;
use irrigo_app::ports::SystemClock;
use irrigo_app::{CommandRouter, ProgramScheduler, StatusReporter, ZoneActuator};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("unable to load configuration")?;
    init_tracing(&config.logging.filter);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting irrigod");

    // Database
    let db = irrigo_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .context("unable to open program database")?;
    let store = Arc::new(SqliteProgramStore::new(db.pool().clone()));

    // Hardware
    let board = Arc::new(VirtualBoard::default());
    let actuator = ZoneActuator::new(board, config.timing.settle_delay());
    actuator.deactivate_all().await;

    // Broker
    let (client, mut eventloop) = config.mqtt.connect();
    let sink = MqttNotificationSink::new(client.clone());

    // Loops
    let scheduler = ProgramScheduler::new(Arc::clone(&store), actuator.clone(), SystemClock)
        .with_interval(config.timing.scheduler_interval())
        .with_error_retry(config.timing.error_retry());
    let reporter = StatusReporter::new(
        Arc::clone(&store),
        actuator.clone(),
        sink.clone(),
        config.topics.status.clone(),
    )
    .with_interval(config.timing.status_interval())
    .with_error_retry(config.timing.error_retry());
    let router = CommandRouter::new(store, actuator.clone(), sink.clone(), config.topics.clone());

    let background = [
        tokio::spawn(scheduler.run()),
        tokio::spawn(reporter.run()),
        tokio::spawn(heartbeat_loop(
            sink,
            config.mqtt.heartbeat_topic.clone(),
            config.mqtt.heartbeat_interval(),
            config.timing.error_retry(),
        )),
    ];

    // Inbound commands run on this task; leaving the select drops the
    // bridge, so nothing can reopen a zone after the final reset.
    tokio::select! {
        () = run_bridge(&mut eventloop, client.clone(), &router, config.mqtt.reconnect_delay()) => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("unable to listen for shutdown signal")?;
        }
    }
    tracing::info!("shutdown requested");

    for task in &background {
        task.abort();
    }
    actuator.deactivate_all().await;
    disconnect(&client, &mut eventloop, DISCONNECT_TIMEOUT).await;
    db.close().await;

    tracing::info!("irrigod stopped");
    Ok(())
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {filter:?} ({err}), falling back to info");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
