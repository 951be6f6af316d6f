//! Alert lifecycle — states, events, and the transition table between them.
//!
//! ```text
//!   Ok ──door_opened──► DoorOpen ──timeout / everyone_left──► Alerting ──timeout──► DoorClosing
//!   NobodyHome ──door_opened / timeout──────────────────────► Alerting
//!   DoorOpen | Alerting | DoorClosing ──door_closed──► Ok
//! ```
//!
//! The table is pure data: it answers "where does `event` lead from
//! `state`?" and nothing else. Guards and side effects live in the
//! application layer's state machine.

mod event;
mod state;

pub use event::AlertEvent;
pub use state::AlertState;

/// Look up the destination of `event` fired in `state`.
///
/// Returns `None` when the pair has no entry, i.e. the event is invalid in
/// that state and must be rejected.
#[must_use]
pub fn transition(event: AlertEvent, state: AlertState) -> Option<AlertState> {
    use AlertEvent as E;
    use AlertState as S;

    let next = match (event, state) {
        (E::EveryoneLeft, S::Ok | S::NobodyHome) => S::NobodyHome,
        (E::EveryoneLeft, S::DoorOpen | S::Alerting) => S::Alerting,
        (E::EveryoneLeft, S::DoorClosing) => S::DoorClosing,

        (E::SomeoneHome, S::Ok | S::NobodyHome) => S::Ok,
        (E::SomeoneHome, S::DoorOpen) => S::DoorOpen,
        (E::SomeoneHome, S::Alerting) => S::Alerting,
        (E::SomeoneHome, S::DoorClosing) => S::DoorClosing,

        (E::DoorOpened, S::Ok | S::DoorOpen) => S::DoorOpen,
        (E::DoorOpened, S::NobodyHome | S::Alerting) => S::Alerting,
        (E::DoorOpened, S::DoorClosing) => S::DoorClosing,

        (E::DoorClosed, S::NobodyHome) => S::NobodyHome,
        (E::DoorClosed, S::Ok | S::DoorOpen | S::Alerting | S::DoorClosing) => S::Ok,

        (E::Timeout, S::NobodyHome | S::DoorOpen) => S::Alerting,
        (E::Timeout, S::Alerting) => S::DoorClosing,
        (E::Timeout, S::Ok | S::DoorClosing) => return None,

        (E::CommandCloseDoor, S::Ok) => S::Ok,
        (E::CommandCloseDoor, S::NobodyHome) => S::NobodyHome,
        (E::CommandCloseDoor, S::DoorOpen | S::Alerting | S::DoorClosing) => S::DoorClosing,
    };
    Some(next)
}

/// Whether `event` has an entry in the table for `state`.
#[must_use]
pub fn can(event: AlertEvent, state: AlertState) -> bool {
    transition(event, state).is_some()
}
