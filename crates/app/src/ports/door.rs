//! Door ports — the actuator that closes the door and the boolean sensors
//! that observe it and the household.

use std::future::Future;

use gdoormon_domain::error::GdoormonError;

/// Issues the "close the door" command. There is no feedback channel: the
/// door sensor reports the outcome later.
pub trait DoorActuator {
    /// Start closing the door. Must not block.
    ///
    /// # Errors
    ///
    /// Returns an error if the command could not be handed to the hardware.
    fn close(&self) -> Result<(), GdoormonError>;
}

impl<T: DoorActuator + ?Sized> DoorActuator for std::sync::Arc<T> {
    fn close(&self) -> Result<(), GdoormonError> {
        (**self).close()
    }
}

/// A periodically polled boolean fact ("is the door open", "is anyone home").
pub trait BinarySensor {
    /// Short name used in logs (e.g. `"door"`).
    fn name(&self) -> &'static str;

    /// Take one reading.
    fn read(&self) -> impl Future<Output = Result<bool, GdoormonError>> + Send;
}

impl<T: BinarySensor + Send + Sync> BinarySensor for std::sync::Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn read(&self) -> impl Future<Output = Result<bool, GdoormonError>> + Send {
        (**self).read()
    }
}
