use std::error::Error;

use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{Classification, classify};

/// Discriminator written as the envelope's `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvelopeKind {
    #[serde(rename = "ERROR")]
    Error,
}

/// Response body describing a failed request
///
/// `detail` is always rendered from a [`crate::UserMessage`]. `error` keeps
/// the original error text for operators and is not a stable contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    kind: EnvelopeKind,
    status: u16,
    detail: String,
    instance: String,
    #[serde(rename = "error")]
    raw: String,
}

impl Envelope {
    /// Classify `err` and describe it for the request at `instance`
    pub fn new(err: &(dyn Error + 'static), instance: impl Into<String>) -> Self {
        Self::from_classification(classify(err), err, instance)
    }

    /// Build from a classification the caller already holds
    pub fn from_classification(
        classification: Classification,
        err: &(dyn Error + 'static),
        instance: impl Into<String>,
    ) -> Self {
        Self {
            kind: EnvelopeKind::Error,
            status: classification.status.as_u16(),
            detail: classification.message.to_string(),
            instance: instance.into(),
            raw: err.to_string(),
        }
    }

    pub const fn kind(&self) -> EnvelopeKind {
        self.kind
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// Build an envelope for an optional error
///
/// No error, no envelope.
pub fn build_envelope(err: Option<&(dyn Error + 'static)>, instance: &str) -> Option<Envelope> {
    err.map(|err| Envelope::new(err, instance))
}
