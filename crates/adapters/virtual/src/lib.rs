//! # gdoormon-adapter-virtual
//!
//! Simulated garage for demos and end-to-end tests.
//!
//! ## Provided devices
//!
//! | Device | Port | Behaviour |
//! |--------|------|-----------|
//! | Door sensor | `BinarySensor` | `true` while the virtual door is open |
//! | Presence sensor | `BinarySensor` | `true` while someone is home |
//! | Door opener | `DoorActuator` | Closes the virtual door after the travel time |
//!
//! All three share one [`VirtualGarage`]; tests and demos flip its state
//! with [`VirtualGarage::open_door`] and [`VirtualGarage::set_present`].
//!
//! ## Dependency rule
//!
//! Depends on `gdoormon-app` (port traits) and `gdoormon-domain` only.

mod devices;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

pub use devices::{VirtualDoorActuator, VirtualDoorSensor, VirtualPresenceSensor};

#[derive(Debug)]
struct GarageState {
    door_open: bool,
    present: bool,
    close_requests: usize,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<GarageState>,
    travel_time: Duration,
}

/// A simulated garage: door closed and someone home to begin with.
///
/// Cloning is cheap; every clone controls the same garage.
#[derive(Debug, Clone)]
pub struct VirtualGarage {
    shared: Arc<Shared>,
}

impl Default for VirtualGarage {
    fn default() -> Self {
        Self::new(Duration::from_secs(15))
    }
}

impl VirtualGarage {
    /// Create a garage whose door needs `travel_time` to close.
    #[must_use]
    pub fn new(travel_time: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(GarageState {
                    door_open: false,
                    present: true,
                    close_requests: 0,
                }),
                travel_time,
            }),
        }
    }

    pub fn open_door(&self) {
        tracing::info!("virtual door opened");
        self.with_state(|state| state.door_open = true);
    }

    pub fn set_present(&self, present: bool) {
        tracing::info!(present, "virtual presence changed");
        self.with_state(|state| state.present = present);
    }

    #[must_use]
    pub fn is_door_open(&self) -> bool {
        self.with_state(|state| state.door_open)
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        self.with_state(|state| state.present)
    }

    /// How many times the opener was asked to close the door.
    #[must_use]
    pub fn close_requests(&self) -> usize {
        self.with_state(|state| state.close_requests)
    }

    #[must_use]
    pub fn door_sensor(&self) -> VirtualDoorSensor {
        VirtualDoorSensor::new(self.clone())
    }

    #[must_use]
    pub fn presence_sensor(&self) -> VirtualPresenceSensor {
        VirtualPresenceSensor::new(self.clone())
    }

    #[must_use]
    pub fn actuator(&self) -> VirtualDoorActuator {
        VirtualDoorActuator::new(self.clone())
    }

    fn travel_time(&self) -> Duration {
        self.shared.travel_time
    }

    fn finish_closing(&self) {
        tracing::info!("virtual door closed");
        self.with_state(|state| state.door_open = false);
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut GarageState) -> R) -> R {
        let mut state = self
            .shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_start_closed_with_someone_home() {
        let garage = VirtualGarage::default();
        assert!(!garage.is_door_open());
        assert!(garage.is_present());
        assert_eq!(garage.close_requests(), 0);
    }

    #[test]
    fn should_share_state_between_clones() {
        let garage = VirtualGarage::default();
        let other = garage.clone();
        garage.open_door();
        other.set_present(false);
        assert!(other.is_door_open());
        assert!(!garage.is_present());
    }
}
