//! Error translation for the WorkoutPal API
//!
//! Turns failures from repositories, the JSON decoder and the runtime into
//! an [`Envelope`]: a user-safe message, an HTTP status, the request path
//! and the raw error text for operators.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc, clippy::missing_const_for_fn)]

mod classify;
pub mod database;
mod envelope;
pub mod json;
pub mod matchers;
mod message;
pub mod validation;

pub use classify::{Classification, classify, classify_optional};
pub use database::DatabaseError;
pub use envelope::{Envelope, EnvelopeKind, build_envelope};
pub use json::JsonError;
pub use message::UserMessage;
pub use validation::{Validate, ValidationError};
