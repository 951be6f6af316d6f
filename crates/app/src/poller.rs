//! Sensor pollers — read a [`BinarySensor`] on a fixed interval and feed the
//! controller one event per reading.
//!
//! Every cycle sends an event, even when the reading did not change; the
//! state machine treats repeats as silent self-transitions.

use std::time::Duration;

use gdoormon_domain::alert::AlertEvent;
use gdoormon_domain::error::GdoormonError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::controller::ControllerHandle;
use crate::ports::BinarySensor;

/// Events sent for a `true` and a `false` reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    pub on_true: AlertEvent,
    pub on_false: AlertEvent,
}

impl Mapping {
    /// `true` means the door is open.
    pub const DOOR: Self = Self {
        on_true: AlertEvent::DoorOpened,
        on_false: AlertEvent::DoorClosed,
    };

    /// `true` means someone is home.
    pub const PRESENCE: Self = Self {
        on_true: AlertEvent::SomeoneHome,
        on_false: AlertEvent::EveryoneLeft,
    };

    #[must_use]
    pub fn event_for(self, reading: bool) -> AlertEvent {
        if reading { self.on_true } else { self.on_false }
    }
}

/// Poll `sensor` every `interval` until the controller goes away.
///
/// The first reading is taken immediately. Read errors are logged and the
/// cycle is skipped.
pub fn spawn_poller<S>(
    sensor: S,
    mapping: Mapping,
    interval: Duration,
    controller: ControllerHandle,
) -> JoinHandle<()>
where
    S: BinarySensor + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(sensor = sensor.name(), ?interval, "poller started");

        loop {
            ticker.tick().await;
            let reading = match sensor.read().await {
                Ok(reading) => reading,
                Err(err) => {
                    tracing::warn!(sensor = sensor.name(), error = %err, "sensor read failed");
                    continue;
                }
            };
            let event = mapping.event_for(reading);
            tracing::trace!(sensor = sensor.name(), reading, %event, "sensor polled");
            if let Err(GdoormonError::Unavailable) = controller.send_event(event).await {
                break;
            }
        }
        tracing::info!(sensor = sensor.name(), "poller stopped");
    })
}
