//! `SQLite` implementation of [`SubscriberStore`].

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use gdoormon_app::ports::SubscriberStore;
use gdoormon_domain::error::GdoormonError;
use gdoormon_domain::identity::BareIdentity;
use gdoormon_domain::subscriber::Subscriber;

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`Subscriber`].
struct Wrapper(Subscriber);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let identity: String = row.try_get("identity")?;
        let subscribed_at: String = row.try_get("subscribed_at")?;

        let identity =
            BareIdentity::from_str(&identity).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let subscribed_at = chrono::DateTime::parse_from_rfc3339(&subscribed_at)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();

        Ok(Self(Subscriber {
            identity,
            subscribed_at,
        }))
    }
}

const INSERT: &str = "INSERT OR IGNORE INTO subscribers (identity, subscribed_at) VALUES (?, ?)";
const SELECT_ALL: &str = "SELECT * FROM subscribers ORDER BY identity";
const DELETE_BY_IDENTITY: &str = "DELETE FROM subscribers WHERE identity = ?";

/// `SQLite`-backed subscriber store.
#[derive(Clone)]
pub struct SqliteSubscriberStore {
    pool: SqlitePool,
}

impl SqliteSubscriberStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl SubscriberStore for SqliteSubscriberStore {
    fn load_all(&self) -> impl Future<Output = Result<Vec<Subscriber>, GdoormonError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn add(&self, subscriber: Subscriber) -> impl Future<Output = Result<(), GdoormonError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(subscriber.identity.as_str())
                .bind(subscriber.subscribed_at.to_rfc3339())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }

    fn remove(
        &self,
        identity: BareIdentity,
    ) -> impl Future<Output = Result<(), GdoormonError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(DELETE_BY_IDENTITY)
                .bind(identity.as_str())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}
