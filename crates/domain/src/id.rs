//! Typed identifier newtypes backed by UUIDs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Access the inner UUID.
            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(
    /// Identity of one logical timer. Survives delay resets.
    TimerId
);

define_id!(
    /// Identifier of an outbound notification.
    MessageId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn should_key_timers_by_distinct_ids() {
        let ids: HashSet<TimerId> = (0..64).map(|_| TimerId::new()).collect();
        assert_eq!(ids.len(), 64);
    }

    #[test]
    fn should_serialize_message_id_as_bare_uuid_string() {
        let id = MessageId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.as_uuid().to_string()));
        let back: MessageId = serde_json::from_value(json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn should_parse_logged_timer_id() {
        let id = TimerId::new();
        assert_eq!(id.to_string().parse::<TimerId>().unwrap(), id);
        assert!(TimerId::from_str("not-a-uuid").is_err());
    }
}
