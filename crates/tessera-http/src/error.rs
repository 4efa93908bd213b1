//! HTTP error types and JSON error responses.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tessera_engine::{EngineError, ErrorKind};
use tracing::error;

/// Errors returned by HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The upload request carried no `document` file part.
    #[error("No file uploaded")]
    NoFile,

    /// `GET /search` without a usable `q` parameter.
    #[error("Query 'q' is required")]
    MissingQuery,

    /// The multipart body could not be read: malformed, over the size
    /// limit, or cut off by the client.
    #[error("{message}")]
    Multipart {
        /// Status chosen by the multipart extractor (400, 413, ...).
        status: StatusCode,
        /// Client-facing description.
        message: String,
    },

    /// An error from the storage engine.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// JSON body of every error response.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl From<&MultipartError> for HttpError {
    fn from(e: &MultipartError) -> Self {
        Self::Multipart {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl From<MultipartError> for HttpError {
    fn from(e: MultipartError) -> Self {
        Self::from(&e)
    }
}

impl HttpError {
    /// Map to an HTTP status code.
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NoFile | Self::MissingQuery => StatusCode::BAD_REQUEST,
            Self::Multipart { status, .. } => *status,
            Self::Engine(e) => match e.kind() {
                ErrorKind::BadInput => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::MissingBlock | ErrorKind::StorageIo | ErrorKind::CorruptRead => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Message shown to the client.
    ///
    /// Server-side faults are logged in full but reported generically.
    fn public_message(&self) -> String {
        match self {
            Self::Engine(e) => match e.kind() {
                ErrorKind::BadInput => e.to_string(),
                ErrorKind::NotFound => "File not found".to_string(),
                ErrorKind::MissingBlock | ErrorKind::CorruptRead => {
                    "stored file is damaged".to_string()
                }
                ErrorKind::StorageIo => "storage failure".to_string(),
            },
            other => other.to_string(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}
