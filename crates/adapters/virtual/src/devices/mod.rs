//! Port implementations backed by a [`VirtualGarage`](crate::VirtualGarage).

mod door;
mod presence;

pub use door::{VirtualDoorActuator, VirtualDoorSensor};
pub use presence::VirtualPresenceSensor;
