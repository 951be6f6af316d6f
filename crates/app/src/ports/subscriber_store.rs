//! Subscriber store port — persistence for the subscriber list.

use std::future::Future;

use gdoormon_domain::error::GdoormonError;
use gdoormon_domain::identity::BareIdentity;
use gdoormon_domain::subscriber::Subscriber;

/// Repository for persisting [`Subscriber`]s across restarts.
pub trait SubscriberStore {
    /// Load every persisted subscriber.
    fn load_all(&self) -> impl Future<Output = Result<Vec<Subscriber>, GdoormonError>> + Send;

    /// Persist a subscriber. Adding an existing identity is not an error.
    fn add(&self, subscriber: Subscriber) -> impl Future<Output = Result<(), GdoormonError>> + Send;

    /// Remove a subscriber. Removing an unknown identity is not an error.
    fn remove(
        &self,
        identity: BareIdentity,
    ) -> impl Future<Output = Result<(), GdoormonError>> + Send;
}
