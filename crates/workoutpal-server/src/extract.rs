use axum::body::{Body, Bytes};
use axum::extract::FromRequest;
use http::{Request, StatusCode};
use serde::de::DeserializeOwned;
use workoutpal_core::{Envelope, Validate, classify, json};

use crate::respond::{ErrorResponse, respond, respond_with_status};

/// Extractor for JSON request bodies
///
/// Decoding failures are classified and rejected with the matching error
/// envelope.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

/// Extractor for JSON request bodies that also pass [`Validate`]
///
/// Validation failures are always rejected with `400 Bad Request`.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ErrorResponse;

    async fn from_request(request: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let instance = request.uri().path().to_owned();

        let bytes = Bytes::from_request(request, state).await.map_err(|rejection| {
            let status = rejection.status();
            let envelope = Envelope::new(&rejection, instance.as_str());
            tracing::debug!(%instance, error = %rejection, "failed to read request body");
            respond_with_status(envelope, status)
        })?;

        match json::decode::<T>(&bytes) {
            Ok(value) => Ok(Self(value)),
            Err(err) => {
                let classification = classify(&err);
                tracing::debug!(
                    %instance,
                    code = classification.message.code(),
                    path = err.path().unwrap_or_default(),
                    error = %err,
                    "rejected request body",
                );
                Err(respond(Envelope::from_classification(classification, &err, instance)))
            }
        }
    }
}

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ErrorResponse;

    async fn from_request(request: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let instance = request.uri().path().to_owned();
        let JsonBody(value) = JsonBody::<T>::from_request(request, state).await?;

        if let Err(err) = value.validate() {
            tracing::debug!(%instance, error = %err, "request failed validation");
            return Err(respond_with_status(Envelope::new(&err, instance), StatusCode::BAD_REQUEST));
        }

        Ok(Self(value))
    }
}
