//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`GdoormonError`] via `From` when crossing a port boundary.

/// Base error type shared by every crate in the workspace.
#[derive(Debug, thiserror::Error)]
pub enum GdoormonError {
    /// A value failed domain validation.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A persistence adapter failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A sensor or actuator failed.
    #[error("device error")]
    Device(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The controller task is no longer running.
    #[error("controller unavailable")]
    Unavailable,
}

/// Domain validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("identity address must not be empty")]
    EmptyAddress,

    #[error("identity resource must not be empty when a '/' is present")]
    EmptyResource,

    #[error("identity contains whitespace or control characters")]
    InvalidCharacter,

    #[error("identity address is malformed")]
    MalformedAddress,
}
