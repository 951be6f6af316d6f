//! Shared fixtures for handler tests.

use std::sync::Arc;
use std::time::Duration;

use gdoormon_app::alert_machine::{AlertConfig, AlertStateMachine};
use gdoormon_app::controller::Controller;
use gdoormon_app::dispatcher::CommandDispatcher;
use gdoormon_app::outbox::{Outbox, OutboxBroadcaster};
use gdoormon_app::ports::DoorActuator;
use gdoormon_app::subscribers::SubscriberRegistry;
use gdoormon_domain::error::GdoormonError;

use crate::state::AppState;

pub(crate) const PASSWORD: &str = "secret";

struct NoopActuator;

impl DoorActuator for NoopActuator {
    fn close(&self) -> Result<(), GdoormonError> {
        Ok(())
    }
}

/// State backed by a real controller with an empty, unpersisted registry.
pub(crate) fn test_state() -> AppState {
    let registry = SubscriberRegistry::new();
    let outbox = Arc::new(Outbox::new(16));
    let machine = AlertStateMachine::new(
        AlertConfig::default(),
        OutboxBroadcaster::new(registry.clone(), Arc::clone(&outbox)),
        NoopActuator,
    );
    let dispatcher =
        CommandDispatcher::new(registry.clone(), PASSWORD, Duration::from_secs(20 * 60));
    let (controller, _task) = Controller::spawn(machine, dispatcher);
    AppState::new(controller, outbox, registry)
}
