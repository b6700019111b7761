use std::error::Error;

use http::StatusCode;

use crate::{UserMessage, database, matchers};

/// User message and HTTP status chosen for an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub message: UserMessage,
    pub status: StatusCode,
}

impl Classification {
    pub const fn new(message: UserMessage, status: StatusCode) -> Self {
        Self { message, status }
    }
}

impl Default for Classification {
    fn default() -> Self {
        Self::new(UserMessage::Default, StatusCode::OK)
    }
}

/// Classify an optional error
///
/// `None` yields the empty message with `200 OK`.
pub fn classify_optional(err: Option<&(dyn Error + 'static)>) -> Classification {
    err.map(classify).unwrap_or_default()
}

/// Classify an error into a user message and HTTP status
///
/// Rules run in a fixed order and the first match wins. Driver errors are
/// checked before anything textual so that a database failure whose text
/// happens to mention another condition still maps by its SQLSTATE.
pub fn classify(err: &(dyn Error + 'static)) -> Classification {
    if let Some(failure) = matchers::driver_failure(err) {
        return database::classify_driver(Some(&failure));
    }

    let json = matchers::json_failure(err);

    if json.as_ref().is_some_and(matchers::JsonFailure::is_datetime) {
        return Classification::new(UserMessage::InvalidFormat, StatusCode::UNPROCESSABLE_ENTITY);
    }

    if let Some((field, expected, got)) = json.as_ref().and_then(matchers::JsonFailure::type_mismatch) {
        return Classification::new(
            UserMessage::InvalidField { field, expected, got },
            StatusCode::UNPROCESSABLE_ENTITY,
        );
    }

    if json.as_ref().is_some_and(matchers::JsonFailure::is_missing_field) {
        return Classification::new(UserMessage::MissingField, StatusCode::UNPROCESSABLE_ENTITY);
    }

    if let Some(position) = json.as_ref().and_then(matchers::JsonFailure::syntax_position) {
        return Classification::new(UserMessage::MalformedJson { position }, StatusCode::BAD_REQUEST);
    }

    let text = err.to_string();

    if let Some(name) = matchers::unknown_field(&text, json.as_ref()) {
        return Classification::new(UserMessage::UnknownField { name }, StatusCode::BAD_REQUEST);
    }

    if matchers::is_truncated(err, json.as_ref()) {
        return Classification::new(UserMessage::TruncatedJson, StatusCode::BAD_REQUEST);
    }

    if matchers::is_datetime_parse(err) {
        return Classification::new(UserMessage::InvalidFormat, StatusCode::UNPROCESSABLE_ENTITY);
    }

    // Raised by the user repository before the insert reaches the database
    if matchers::mentions(err, "user already exists") {
        return Classification::new(UserMessage::Duplicate, StatusCode::BAD_REQUEST);
    }

    // TODO: return 404 once API consumers agree to the status change
    if matchers::is_no_rows(err) {
        return Classification::new(UserMessage::NotFound, StatusCode::INTERNAL_SERVER_ERROR);
    }

    if matchers::is_deadline_exceeded(err) {
        return Classification::new(UserMessage::Timeout, StatusCode::GATEWAY_TIMEOUT);
    }

    Classification::new(UserMessage::Unknown, StatusCode::INTERNAL_SERVER_ERROR)
}
