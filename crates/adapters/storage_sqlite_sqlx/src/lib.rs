//! # gdoormon-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `SubscriberStore` port defined in `gdoormon-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `gdoormon-app` (for port traits) and `gdoormon-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod pool;
mod subscriber_store;

pub use error::StorageError;
pub use pool::{Config, Database};
pub use subscriber_store::SqliteSubscriberStore;
