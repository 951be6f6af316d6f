//! # gdoormon-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Accept **inbound chat messages** as JSON (`POST /api/messages`) and
//!   return the dispatcher's reply, acting as a local chat transport
//! - Expose the **current state** and subscriber list for inspection
//! - Accept **sensor readings pushed** by external devices
//! - Stream the **outbox** (`GET /api/outbox/stream`) as Server-Sent Events so
//!   a chat bridge can deliver notices to subscribers
//!
//! ## Dependency rule
//! Depends on `gdoormon-app` (for the controller handle, outbox and
//! registry) and `gdoormon-domain` (for request/response types). Never leaks
//! axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
mod testing;
