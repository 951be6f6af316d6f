//! Virtual presence sensor.

use std::future::Future;

use gdoormon_app::ports::BinarySensor;
use gdoormon_domain::error::GdoormonError;

use crate::VirtualGarage;

/// Reports `true` while someone is home.
#[derive(Debug, Clone)]
pub struct VirtualPresenceSensor {
    garage: VirtualGarage,
}

impl VirtualPresenceSensor {
    pub(crate) fn new(garage: VirtualGarage) -> Self {
        Self { garage }
    }
}

impl BinarySensor for VirtualPresenceSensor {
    fn name(&self) -> &'static str {
        "virtual_presence"
    }

    fn read(&self) -> impl Future<Output = Result<bool, GdoormonError>> + Send {
        let present = self.garage.is_present();
        async move { Ok(present) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_follow_garage_presence() {
        let garage = VirtualGarage::default();
        let sensor = garage.presence_sensor();
        assert!(sensor.read().await.unwrap());

        garage.set_present(false);
        assert!(!sensor.read().await.unwrap());
    }
}
