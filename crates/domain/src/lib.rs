//! # gdoormon-domain
//!
//! Pure domain model for the gdoormon garage door monitor.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Identities** (transport addresses with an optional resource suffix)
//! - Define **Alert states and events** and the transition table between them
//! - Define **Commands** (inbound chat text tokenized into a verb and arguments)
//! - Define **Subscribers** (bare identities that receive broadcasts)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod alert;
pub mod command;
pub mod identity;
pub mod subscriber;
