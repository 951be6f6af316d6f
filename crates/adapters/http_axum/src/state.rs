//! Shared application state for axum handlers.

use std::sync::Arc;

use gdoormon_app::controller::ControllerHandle;
use gdoormon_app::outbox::Outbox;
use gdoormon_app::subscribers::SubscriberRegistry;

/// Application state shared across all axum handlers.
///
/// Every field is a cheap handle, so cloning per request is fine.
#[derive(Clone)]
pub struct AppState {
    /// Mailbox of the task that owns the state machine.
    pub controller: ControllerHandle,
    /// Outbound notices, re-published on the SSE stream.
    pub outbox: Arc<Outbox>,
    /// Current subscribers, read-only from HTTP.
    pub registry: SubscriberRegistry,
}

impl AppState {
    #[must_use]
    pub fn new(
        controller: ControllerHandle,
        outbox: Arc<Outbox>,
        registry: SubscriberRegistry,
    ) -> Self {
        Self {
            controller,
            outbox,
            registry,
        }
    }
}
