//! Alert state machine — guarded transitions with timed, cancellable side effects.
//!
//! The machine owns its current [`AlertState`], at most one pending timer,
//! and the collaborators it drives (a [`Broadcaster`] and a [`DoorActuator`]).
//! It must only ever be touched from one execution context; see
//! [`controller`](crate::controller) for the task that guarantees this.
//!
//! Invariant: a timer is pending iff the state is `DoorOpen` or `Alerting`.

use std::time::Duration;

use gdoormon_domain::alert::{self, AlertEvent, AlertState};
use gdoormon_domain::id::TimerId;
use gdoormon_domain::identity::Identity;
use gdoormon_domain::time::describe_duration;
use tokio::time::Instant;

use crate::dispatcher::AlertCommands;
use crate::ports::{Broadcaster, DoorActuator};
use crate::timer::{TimerHandle, TimerManager};

/// Notice broadcast (and replied) when the door is being closed.
pub const CLOSING_NOTICE: &str = "closing the door";
/// Notice broadcast when the door closes after subscribers were alerted.
pub const CLOSED_NOTICE: &str = "Door closed.";
/// Reply to a snooze request while no timer is running.
pub const NO_TIMEOUT_PENDING: &str = "no timeout pending";

/// Timeouts applied by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertConfig {
    /// How long the door may stay open while someone is home.
    pub door_open_timeout: Duration,
    /// How long subscribers have to react to an alert before the door is closed.
    pub alert_timeout: Duration,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            door_open_timeout: Duration::from_secs(10 * 60),
            alert_timeout: Duration::from_secs(5 * 60),
        }
    }
}

/// What applying one event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The state changed and entry side effects ran.
    Changed {
        from: AlertState,
        to: AlertState,
        /// Confirmation for the caller, when the entered state produces one.
        reply: Option<String>,
    },
    /// The event led back to the current state; nothing happened.
    Unchanged(AlertState),
    /// A self-transition out of `Alerting` or `DoorClosing` was refused.
    Vetoed(AlertState),
    /// The event has no entry for the current state.
    Rejected(AlertState),
}

impl Transition {
    /// State after the event was handled.
    #[must_use]
    pub fn state(&self) -> AlertState {
        match self {
            Self::Changed { to, .. } => *to,
            Self::Unchanged(state) | Self::Vetoed(state) | Self::Rejected(state) => *state,
        }
    }
}

/// The door/presence/alert finite state machine.
pub struct AlertStateMachine<B, A> {
    state: AlertState,
    pending: Option<TimerHandle>,
    timers: TimerManager<AlertEvent>,
    config: AlertConfig,
    broadcaster: B,
    actuator: A,
}

impl<B, A> AlertStateMachine<B, A>
where
    B: Broadcaster,
    A: DoorActuator,
{
    /// Create a machine in the `Ok` state with no timer pending.
    pub fn new(config: AlertConfig, broadcaster: B, actuator: A) -> Self {
        Self {
            state: AlertState::Ok,
            pending: None,
            timers: TimerManager::new(),
            config,
            broadcaster,
            actuator,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> AlertState {
        self.state
    }

    /// Whether `event_name` is a valid event in the current state.
    #[must_use]
    pub fn can(&self, event_name: &str) -> bool {
        AlertEvent::from_name(event_name).is_some_and(|event| alert::can(event, self.state))
    }

    /// Whether a door-open or alert timer is running.
    #[must_use]
    pub fn has_pending_timer(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left on the pending timer.
    #[must_use]
    pub fn pending_remaining(&self) -> Option<Duration> {
        self.pending
            .as_ref()
            .and_then(|handle| self.timers.remaining(handle))
    }

    /// When the pending timer is due, for the owner's sleep.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn door_opened(&mut self) -> Transition {
        self.apply(AlertEvent::DoorOpened)
    }

    pub fn door_closed(&mut self) -> Transition {
        self.apply(AlertEvent::DoorClosed)
    }

    pub fn someone_home(&mut self) -> Transition {
        self.apply(AlertEvent::SomeoneHome)
    }

    pub fn everyone_left(&mut self) -> Transition {
        self.apply(AlertEvent::EveryoneLeft)
    }

    /// User command: close the door now.
    pub fn command_close_door(&mut self, sender: &Identity, args: &[String]) -> Transition {
        tracing::info!(%sender, ?args, "close door requested");
        self.apply(AlertEvent::CommandCloseDoor)
    }

    /// Apply an externally observed event. `timeout` is reserved for the
    /// machine's own timer and is rejected here.
    pub fn handle(&mut self, event: AlertEvent) -> Transition {
        if event == AlertEvent::Timeout {
            tracing::warn!("timeout events are only raised by the pending timer");
            return Transition::Rejected(self.state);
        }
        self.apply(event)
    }

    /// Deliver every timer that is due now.
    pub fn fire_due(&mut self) -> Vec<Transition> {
        let now = Instant::now();
        let mut fired = Vec::new();
        while let Some((id, event)) = self.timers.pop_expired(now) {
            fired.push(self.on_timer_fired(id, event));
        }
        fired
    }

    /// Push the pending timer back to fire `duration` from now.
    ///
    /// Returns an empty string once subscribers have been told about the
    /// snooze, or [`NO_TIMEOUT_PENDING`] if there is nothing to snooze.
    pub fn snooze_alert(&mut self, duration: Duration) -> String {
        let Some(handle) = self.pending.as_ref() else {
            tracing::info!("snooze requested with no timeout pending");
            return NO_TIMEOUT_PENDING.to_string();
        };
        let rearmed = self.timers.reset(handle, duration);
        debug_assert!(rearmed, "pending handle must refer to an armed timer");
        self.broadcast(&format!(
            "Alert snoozed, will timeout in {}",
            describe_duration(duration)
        ));
        String::new()
    }

    fn on_timer_fired(&mut self, id: TimerId, event: AlertEvent) -> Transition {
        let expected = self.pending.as_ref().is_some_and(|handle| handle.id() == id);
        if !expected {
            tracing::error!(timer = %id, state = %self.state, "timer fired while not pending");
            debug_assert!(expected, "timer {id} fired while not pending");
            return Transition::Rejected(self.state);
        }
        self.pending = None;
        self.apply(event)
    }

    fn apply(&mut self, event: AlertEvent) -> Transition {
        let from = self.state;
        let Some(to) = alert::transition(event, from) else {
            tracing::warn!(%event, state = %from, "event not valid in current state");
            return Transition::Rejected(from);
        };

        if to == from {
            if from.vetoes_self_transition() {
                tracing::debug!(%event, state = %from, "self-transition vetoed");
                return Transition::Vetoed(from);
            }
            tracing::debug!(%event, state = %from, "already in state, not transitioning");
            return Transition::Unchanged(from);
        }

        tracing::info!(%event, %from, %to, "changing state");
        self.state = to;
        let reply = match to {
            AlertState::DoorOpen => {
                self.enter_door_open(from);
                None
            }
            AlertState::Alerting => {
                self.enter_alerting(from);
                None
            }
            AlertState::DoorClosing => Some(self.enter_door_closing()),
            AlertState::Ok => {
                self.enter_ok(event, from);
                None
            }
            AlertState::NobodyHome => None,
        };
        self.check_timer_invariant();

        Transition::Changed { from, to, reply }
    }

    fn enter_door_open(&mut self, from: AlertState) {
        if self.pending.is_some() {
            self.expect_source(AlertState::DoorOpen, from, &[AlertState::Alerting]);
            self.cancel_pending();
        }
        self.pending = Some(
            self.timers
                .schedule(self.config.door_open_timeout, AlertEvent::Timeout),
        );
    }

    fn enter_alerting(&mut self, from: AlertState) {
        if self.pending.is_some() {
            self.expect_source(AlertState::Alerting, from, &[AlertState::DoorOpen]);
            self.cancel_pending();
        }
        self.broadcast(&format!(
            "DOOR ALERT: the garage door is open and will be closed in {}. \
             Reply \"snooze [minutes]\" to wait longer or \"close_door\" to close it now.",
            describe_duration(self.config.alert_timeout)
        ));
        self.pending = Some(
            self.timers
                .schedule(self.config.alert_timeout, AlertEvent::Timeout),
        );
    }

    fn enter_door_closing(&mut self) -> String {
        self.cancel_pending();
        self.broadcast(CLOSING_NOTICE);
        if let Err(err) = self.actuator.close() {
            tracing::warn!(error = %err, "door actuator failed");
        }
        CLOSING_NOTICE.to_string()
    }

    fn enter_ok(&mut self, event: AlertEvent, from: AlertState) {
        self.cancel_pending();
        if event == AlertEvent::DoorClosed
            && matches!(from, AlertState::Alerting | AlertState::DoorClosing)
        {
            self.broadcast(CLOSED_NOTICE);
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.timers.cancel(&handle);
        }
    }

    fn broadcast(&self, text: &str) {
        tracing::info!(text, "broadcasting");
        if let Err(err) = self.broadcaster.send_all_subscribers(text) {
            tracing::warn!(error = %err, "broadcast failed");
        }
    }

    fn expect_source(&self, to: AlertState, from: AlertState, allowed: &[AlertState]) {
        let expected = allowed.contains(&from);
        if !expected {
            tracing::error!(%from, %to, "entered state with a pending timer from unexpected source");
        }
        debug_assert!(expected, "entered {to} with a pending timer from {from}");
    }

    fn check_timer_invariant(&self) {
        let consistent = self.pending.is_some() == self.state.holds_timer();
        if !consistent {
            tracing::error!(
                state = %self.state,
                pending = self.pending.is_some(),
                "pending timer does not match state"
            );
        }
        debug_assert!(consistent, "pending timer does not match state {}", self.state);
    }
}

impl<B, A> AlertCommands for AlertStateMachine<B, A>
where
    B: Broadcaster,
    A: DoorActuator,
{
    fn state(&self) -> AlertState {
        self.state
    }

    fn can(&self, event_name: &str) -> bool {
        AlertStateMachine::can(self, event_name)
    }

    fn invoke(&mut self, event_name: &str, sender: &Identity, args: &[String]) -> String {
        let transition = match AlertEvent::from_name(event_name) {
            Some(AlertEvent::CommandCloseDoor) => self.command_close_door(sender, args),
            _ => return "bad command".to_string(),
        };
        match transition {
            Transition::Changed {
                reply: Some(reply), ..
            } => reply,
            Transition::Changed { to, .. } => format!("state is now {to}"),
            Transition::Unchanged(state) | Transition::Vetoed(state) => {
                format!("nothing to do, state is {state}")
            }
            Transition::Rejected(_) => "bad command".to_string(),
        }
    }

    fn snooze_alert(&mut self, duration: Duration) -> String {
        AlertStateMachine::snooze_alert(self, duration)
    }
}
