//! # gdoormon-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `Broadcaster` — send a notice to every subscriber
//!   - `DoorActuator` — close the door
//!   - `BinarySensor` — read one boolean fact (door open, someone present)
//!   - `SubscriberStore` — persist the subscriber list
//! - Provide the **core use-cases**:
//!   - `TimerManager` — a single delayed, cancellable, resettable timer queue
//!   - `AlertStateMachine` — guarded transitions with timed side effects
//!   - `CommandDispatcher` — chat command parsing, authorization, routing
//! - Provide **in-process infrastructure** that doesn't need IO: the
//!   controller task serializing all state machine access, the subscriber
//!   registry, the outbox, and sensor pollers
//!
//! ## Dependency rule
//! Depends on `gdoormon-domain` only (plus `tokio` for channels and time).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod alert_machine;
pub mod controller;
pub mod dispatcher;
pub mod outbox;
pub mod poller;
pub mod ports;
pub mod subscribers;
pub mod timer;
