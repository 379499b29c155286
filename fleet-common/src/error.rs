//! The stable error envelope shared by all three HTTP surfaces (spec §7).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// `{"error": "<human-readable>"}` — the only error shape any component
/// ever returns to a client. Upstream bodies proxied verbatim by the
/// Router are never wrapped in this envelope.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    pub fn response(status: StatusCode, message: impl Into<String>) -> Response {
        (status, Json(Self::new(message))).into_response()
    }
}

impl From<&str> for ErrorEnvelope {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ErrorEnvelope {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Startup-fatal errors (spec §7 "startup-fatal"): a config file that
/// can't be read or parsed, or a malformed outbound request. These never
/// reach a client as an [`ErrorEnvelope`] — they propagate out of `main`
/// and the process exits non-zero, in the spirit of
/// `ultrafast-models-sdk/src/error.rs`'s `ClientError`/`ProviderError`
/// split, scaled down to the handful of variants this workspace's
/// `main`s actually construct.
#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    #[error("failed to read config file {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
