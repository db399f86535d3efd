//! Domain layer containing the push vocabulary.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (identifiers, timestamps, validation errors)
//! - `realtime` - Push messages, close reasons and delivery errors

pub mod foundation;
pub mod realtime;
