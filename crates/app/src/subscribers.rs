//! Subscriber registry — the in-memory set of bare identities that receive
//! alerts, with write-behind persistence.

use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};

use gdoormon_domain::error::GdoormonError;
use gdoormon_domain::identity::BareIdentity;
use gdoormon_domain::subscriber::Subscriber;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::ports::SubscriberStore;

/// A membership change to be mirrored into the [`SubscriberStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionChange {
    Added(Subscriber),
    Removed(BareIdentity),
}

/// Shared handle to the current subscriber set.
///
/// Cloning is cheap; all clones see the same set. Membership is always keyed
/// on the bare identity, so every session of one account shares a
/// subscription.
#[derive(Debug, Clone, Default)]
pub struct SubscriberRegistry {
    members: Arc<RwLock<BTreeSet<BareIdentity>>>,
    changes: Option<mpsc::UnboundedSender<SubscriptionChange>>,
}

impl SubscriberRegistry {
    /// An empty registry that is not persisted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry seeded with `members` that reports every change on `changes`.
    #[must_use]
    pub fn persisted(
        members: impl IntoIterator<Item = BareIdentity>,
        changes: mpsc::UnboundedSender<SubscriptionChange>,
    ) -> Self {
        Self {
            members: Arc::new(RwLock::new(members.into_iter().collect())),
            changes: Some(changes),
        }
    }

    /// Load the persisted subscribers from `store` and spawn the task that
    /// writes later changes back to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial load fails.
    pub async fn load<S>(store: Arc<S>) -> Result<(Self, JoinHandle<()>), GdoormonError>
    where
        S: SubscriberStore + Send + Sync + 'static,
    {
        let existing = store.load_all().await?;
        tracing::info!(count = existing.len(), "loaded subscribers");
        let (tx, rx) = mpsc::unbounded_channel();
        let registry = Self::persisted(existing.into_iter().map(|s| s.identity), tx);
        let task = tokio::spawn(persist_changes(store, rx));
        Ok((registry, task))
    }

    #[must_use]
    pub fn contains(&self, identity: &BareIdentity) -> bool {
        self.read().contains(identity)
    }

    /// Add `identity`. Returns `false` if it was already subscribed.
    pub fn add(&self, identity: BareIdentity) -> bool {
        let inserted = self.write().insert(identity.clone());
        if inserted {
            tracing::info!(%identity, "subscribed");
            self.notify(SubscriptionChange::Added(Subscriber::new(identity)));
        }
        inserted
    }

    /// Remove `identity`. Returns `false` if it was not subscribed.
    pub fn remove(&self, identity: &BareIdentity) -> bool {
        let removed = self.write().remove(identity);
        if removed {
            tracing::info!(%identity, "unsubscribed");
            self.notify(SubscriptionChange::Removed(identity.clone()));
        }
        removed
    }

    /// Snapshot of every subscriber, sorted.
    #[must_use]
    pub fn all(&self) -> Vec<BareIdentity> {
        self.read().iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn notify(&self, change: SubscriptionChange) {
        if let Some(changes) = &self.changes
            && changes.send(change).is_err()
        {
            tracing::warn!("subscriber persistence task is gone, change not saved");
        }
    }

    // Sets of strings stay consistent even if a writer panicked.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeSet<BareIdentity>> {
        self.members.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeSet<BareIdentity>> {
        self.members.write().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn persist_changes<S>(store: Arc<S>, mut rx: mpsc::UnboundedReceiver<SubscriptionChange>)
where
    S: SubscriberStore + Send + Sync + 'static,
{
    while let Some(change) = rx.recv().await {
        let result = match change {
            SubscriptionChange::Added(subscriber) => store.add(subscriber).await,
            SubscriptionChange::Removed(identity) => store.remove(identity).await,
        };
        if let Err(err) = result {
            tracing::error!(error = %err, "failed to persist subscriber change");
        }
    }
    tracing::debug!("subscriber persistence task stopped");
}
