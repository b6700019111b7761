//! Writing error envelopes to HTTP responses

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use workoutpal_core::Envelope;

/// An envelope paired with the status line it is sent under
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    status: StatusCode,
    envelope: Envelope,
}

impl ErrorResponse {
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub const fn envelope(&self) -> &Envelope {
        &self.envelope
    }
}

/// Send `envelope` under its own status
pub fn respond(envelope: Envelope) -> ErrorResponse {
    ErrorResponse {
        status: envelope.status(),
        envelope,
    }
}

/// Send `envelope` under `status`, leaving the body untouched
pub fn respond_with_status(envelope: Envelope, status: StatusCode) -> ErrorResponse {
    ErrorResponse { status, envelope }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}
