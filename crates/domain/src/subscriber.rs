//! Subscriber — a bare identity that receives broadcast notices.

use serde::{Deserialize, Serialize};

use crate::identity::BareIdentity;
use crate::time::{Timestamp, now};

/// A subscribed identity and when it subscribed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub identity: BareIdentity,
    pub subscribed_at: Timestamp,
}

impl Subscriber {
    /// A subscriber registered right now.
    #[must_use]
    pub fn new(identity: BareIdentity) -> Self {
        Self {
            identity,
            subscribed_at: now(),
        }
    }
}
