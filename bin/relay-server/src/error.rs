//! HTTP-facing errors.
//!
//! Handlers return `Result<_, ServerError>`; the response body is always
//! `{"error": "<message>"}`.
//!
//! Upstream failures pass the provider's text through to the caller so a UI
//! can show why the model refused.  Internal errors are logged in full and
//! answered with a generic message.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use relay_types::ValidationError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::relay::RelayError;

/// All errors that can occur in the relay-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Malformed body, empty conversation or blank message.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No usable model handle.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The provider call failed; the text is the provider's own.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Anything else; details stay in the log.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match self {
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ServerError::ServiceUnavailable(m) => {
                warn!(message = %m, "service unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, m)
            }
            ServerError::Upstream(m) => {
                error!(message = %m, "provider error");
                (StatusCode::INTERNAL_SERVER_ERROR, m)
            }
            ServerError::Internal(m) => {
                error!(message = %m, "request failed internally");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

impl From<RelayError> for ServerError {
    fn from(e: RelayError) -> Self {
        match e {
            RelayError::Validation(v) => ServerError::from(v),
            RelayError::ServiceUnavailable(m) => ServerError::ServiceUnavailable(m),
            RelayError::Upstream(m) => ServerError::Upstream(m),
        }
    }
}

impl From<ValidationError> for ServerError {
    fn from(e: ValidationError) -> Self {
        ServerError::BadRequest(e.to_string())
    }
}

impl From<JsonRejection> for ServerError {
    fn from(e: JsonRejection) -> Self {
        ServerError::BadRequest(e.body_text())
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(e: anyhow::Error) -> Self {
        error!(error = ?e, "unexpected failure");
        ServerError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(resp: Response) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_maps_to_400() {
        let resp = ServerError::from(RelayError::Validation(ValidationError::NoMessages)).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_of(resp).await["error"], "No messages provided");
    }

    #[tokio::test]
    async fn unavailable_maps_to_503() {
        let resp = ServerError::from(RelayError::ServiceUnavailable("Model m is not available".into()))
            .into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn upstream_text_is_passed_through() {
        let resp = ServerError::from(RelayError::Upstream("400 API key not valid.".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(resp).await["error"], "400 API key not valid.");
    }

    #[tokio::test]
    async fn internal_detail_is_hidden() {
        let resp = ServerError::from(anyhow::anyhow!("/etc/secret exploded")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(resp).await["error"], "internal server error");
    }
}
