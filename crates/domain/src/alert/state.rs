//! Alert state — where the door/presence lifecycle currently stands.

use serde::{Deserialize, Serialize};

/// Discrete state of the alert lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertState {
    /// All good: door closed, or open with nothing to report yet.
    #[default]
    Ok,
    /// Door closed, nobody home.
    NobodyHome,
    /// Door open, someone home; the door-open timer is running.
    DoorOpen,
    /// Door open and either nobody home or open too long; the alert timer is running.
    Alerting,
    /// A close command was sent to the actuator.
    DoorClosing,
}

impl AlertState {
    /// Every state, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Ok,
        Self::NobodyHome,
        Self::DoorOpen,
        Self::Alerting,
        Self::DoorClosing,
    ];

    /// Whether a timer must be pending while in this state.
    #[must_use]
    pub fn holds_timer(self) -> bool {
        matches!(self, Self::DoorOpen | Self::Alerting)
    }

    /// Whether a transition from this state back to itself is vetoed
    /// instead of being applied silently.
    #[must_use]
    pub fn vetoes_self_transition(self) -> bool {
        matches!(self, Self::Alerting | Self::DoorClosing)
    }

    /// Lower snake-case name, as reported by status queries.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NobodyHome => "nobody_home",
            Self::DoorOpen => "door_open",
            Self::Alerting => "alerting",
            Self::DoorClosing => "door_closing",
        }
    }
}

impl std::fmt::Display for AlertState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
