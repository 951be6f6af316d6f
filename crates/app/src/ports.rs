//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod broadcaster;
pub mod door;
pub mod subscriber_store;

pub use broadcaster::Broadcaster;
pub use door::{BinarySensor, DoorActuator};
pub use subscriber_store::SubscriberStore;
