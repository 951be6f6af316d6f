//! # gdoormond — garage door monitor daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and initialise logging
//! - Initialize the `SQLite` connection pool, run migrations, load subscribers
//! - Construct the state machine, dispatcher and the controller task that owns them
//! - Start sensor pollers against the virtual garage when enabled
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (Ctrl-C), letting pending subscriber writes finish
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use gdoormon_adapter_http_axum::state::AppState;
use gdoormon_adapter_storage_sqlite_sqlx::SqliteSubscriberStore;
use gdoormon_adapter_virtual::{VirtualDoorActuator, VirtualGarage};
use gdoormon_app::alert_machine::AlertStateMachine;
use gdoormon_app::controller::Controller;
use gdoormon_app::dispatcher::CommandDispatcher;
use gdoormon_app::outbox::{Outbox, OutboxBroadcaster};
use gdoormon_app::poller::{Mapping, spawn_poller};
use gdoormon_app::ports::DoorActuator;
use gdoormon_app::subscribers::SubscriberRegistry;
use gdoormon_domain::error::GdoormonError;

use crate::config::Config;

const OUTBOX_CAPACITY: usize = 256;

/// The door opener in use.
enum Opener {
    Virtual(VirtualDoorActuator),
    /// No hardware adapter is wired; close requests are only logged.
    Unwired,
}

impl DoorActuator for Opener {
    fn close(&self) -> Result<(), GdoormonError> {
        match self {
            Self::Virtual(actuator) => actuator.close(),
            Self::Unwired => {
                tracing::warn!("no door opener configured, close request ignored");
                Ok(())
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = gdoormon_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .context("failed to open database")?;

    // Subscribers
    let store = Arc::new(SqliteSubscriberStore::new(db.pool().clone()));
    let (registry, persistence) = SubscriberRegistry::load(store)
        .await
        .context("failed to load subscribers")?;

    // Outbox
    let outbox = Arc::new(Outbox::new(OUTBOX_CAPACITY));
    let broadcaster = OutboxBroadcaster::new(registry.clone(), Arc::clone(&outbox));

    // Devices
    let garage = config
        .integrations
        .virtual_enabled
        .then(VirtualGarage::default);
    let opener = match &garage {
        Some(garage) => Opener::Virtual(garage.actuator()),
        None => Opener::Unwired,
    };

    // State machine and controller
    let machine = AlertStateMachine::new(config.alert_config(), broadcaster, opener);
    let dispatcher = CommandDispatcher::new(
        registry.clone(),
        config.chat.password.clone(),
        config.default_snooze(),
    );
    let (controller, controller_task) = Controller::spawn(machine, dispatcher);

    // Pollers
    let mut pollers = Vec::new();
    if let Some(garage) = &garage {
        tracing::info!("virtual garage enabled");
        pollers.push(spawn_poller(
            garage.door_sensor(),
            Mapping::DOOR,
            config.poll_interval(),
            controller.clone(),
        ));
        pollers.push(spawn_poller(
            garage.presence_sensor(),
            Mapping::PRESENCE,
            config.poll_interval(),
            controller.clone(),
        ));
    }

    // HTTP
    let state = AppState::new(controller, outbox, registry.clone());
    let app = gdoormon_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "gdoormond listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // Stop producers, then let the controller and persistence drain.
    for poller in pollers {
        poller.abort();
        let _ = poller.await;
    }
    controller_task.await.context("controller task failed")?;
    drop(registry);
    persistence.await.context("persistence task failed")?;

    tracing::info!("gdoormond stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
