//! Virtual door sensor and opener.

use std::future::Future;

use gdoormon_app::ports::{BinarySensor, DoorActuator};
use gdoormon_domain::error::GdoormonError;

use crate::VirtualGarage;

/// Reports `true` while the virtual door is open.
#[derive(Debug, Clone)]
pub struct VirtualDoorSensor {
    garage: VirtualGarage,
}

impl VirtualDoorSensor {
    pub(crate) fn new(garage: VirtualGarage) -> Self {
        Self { garage }
    }
}

impl BinarySensor for VirtualDoorSensor {
    fn name(&self) -> &'static str {
        "virtual_door"
    }

    fn read(&self) -> impl Future<Output = Result<bool, GdoormonError>> + Send {
        let open = self.garage.is_door_open();
        async move { Ok(open) }
    }
}

/// Raised when the opener is used outside a tokio runtime.
#[derive(Debug, thiserror::Error)]
#[error("virtual door opener needs a tokio runtime")]
pub struct NoRuntime;

/// Closes the virtual door once its travel time has elapsed.
///
/// Like a real opener it gives no feedback; the door sensor reports the
/// result on a later poll.
#[derive(Debug, Clone)]
pub struct VirtualDoorActuator {
    garage: VirtualGarage,
}

impl VirtualDoorActuator {
    pub(crate) fn new(garage: VirtualGarage) -> Self {
        Self { garage }
    }
}

impl DoorActuator for VirtualDoorActuator {
    fn close(&self) -> Result<(), GdoormonError> {
        self.garage.with_state(|state| state.close_requests += 1);
        let travel_time = self.garage.travel_time();
        if travel_time.is_zero() {
            self.garage.finish_closing();
            return Ok(());
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| GdoormonError::Device(Box::new(NoRuntime)))?;
        let garage = self.garage.clone();
        tracing::info!(?travel_time, "virtual door closing");
        runtime.spawn(async move {
            tokio::time::sleep(travel_time).await;
            garage.finish_closing();
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn should_follow_garage_door() {
        let garage = VirtualGarage::default();
        let sensor = garage.door_sensor();
        assert!(!sensor.read().await.unwrap());

        garage.open_door();
        assert!(sensor.read().await.unwrap());
    }

    #[test]
    fn should_close_immediately_without_travel_time() {
        let garage = VirtualGarage::new(Duration::ZERO);
        garage.open_door();
        garage.actuator().close().unwrap();
        assert!(!garage.is_door_open());
        assert_eq!(garage.close_requests(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn should_close_after_travel_time() {
        let garage = VirtualGarage::new(Duration::from_secs(15));
        garage.open_door();
        garage.actuator().close().unwrap();
        assert!(garage.is_door_open());

        tokio::time::sleep(Duration::from_secs(14)).await;
        assert!(garage.is_door_open());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!garage.is_door_open());
    }

    #[test]
    fn should_fail_without_runtime_when_door_must_travel() {
        let garage = VirtualGarage::new(Duration::from_secs(15));
        let err = garage.actuator().close().unwrap_err();
        assert!(matches!(err, GdoormonError::Device(_)));
        assert_eq!(garage.close_requests(), 1);
    }
}
