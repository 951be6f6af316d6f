//! Alert events — fact changes, timer expiry, and user commands.

use serde::{Deserialize, Serialize};

/// An input to the alert lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertEvent {
    EveryoneLeft,
    SomeoneHome,
    DoorOpened,
    DoorClosed,
    Timeout,
    CommandCloseDoor,
}

impl AlertEvent {
    /// Every event, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::EveryoneLeft,
        Self::SomeoneHome,
        Self::DoorOpened,
        Self::DoorClosed,
        Self::Timeout,
        Self::CommandCloseDoor,
    ];

    /// Event name as used by forwarded chat commands.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::EveryoneLeft => "everyone_left",
            Self::SomeoneHome => "someone_home",
            Self::DoorOpened => "door_opened",
            Self::DoorClosed => "door_closed",
            Self::Timeout => "timeout",
            Self::CommandCloseDoor => "command_close_door",
        }
    }

    /// Resolve an event by its name; `None` for unknown names.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.name() == name)
    }

    /// Whether the event originates from a user command (and thus produces
    /// a reply).
    #[must_use]
    pub fn is_command(self) -> bool {
        matches!(self, Self::CommandCloseDoor)
    }
}

impl std::fmt::Display for AlertEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_resolve_every_event_by_name() {
        for event in AlertEvent::ALL {
            assert_eq!(AlertEvent::from_name(event.name()), Some(event));
        }
    }

    #[test]
    fn should_return_none_for_unknown_name() {
        assert_eq!(AlertEvent::from_name("asdf"), None);
        assert_eq!(AlertEvent::from_name("close_door"), None);
    }

    #[test]
    fn should_flag_only_close_door_as_command() {
        let commands: Vec<_> = AlertEvent::ALL
            .into_iter()
            .filter(|e| e.is_command())
            .collect();
        assert_eq!(commands, vec![AlertEvent::CommandCloseDoor]);
    }
}
