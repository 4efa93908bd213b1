//! HTTP request handlers.
//!
//! Each handler maps one route onto one [`TesseraNode`](tessera_engine::TesseraNode)
//! operation.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use tessera_engine::EngineError;
use tokio_util::io::StreamReader;
use tracing::info;

use crate::AppState;
use crate::error::HttpError;

/// Multipart field carrying the uploaded file.
const UPLOAD_FIELD: &str = "document";

// -----------------------------------------------------------------------
// POST /upload
// -----------------------------------------------------------------------

/// Response body for `POST /upload`.
#[derive(Serialize)]
pub(crate) struct UploadResponse {
    pub status: &'static str,
    pub blocks: usize,
}

/// Ingest the `document` part of a multipart upload.
///
/// The stored filename is the last path component of the part's
/// `filename`; it is validated again by the node before use. The part is
/// fed to the node as a stream, so at most one block is buffered.
#[tracing::instrument(skip(state, multipart))]
pub(crate) async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(|n| base_name(n).to_string()) else {
            return Err(HttpError::NoFile);
        };

        let reader = StreamReader::new(field.map_err(std::io::Error::other));
        tokio::pin!(reader);
        let receipt = state
            .node
            .ingest(&filename, reader)
            .await
            .map_err(upload_error)?;
        info!(
            filename = %receipt.filename,
            blocks = receipt.blocks,
            new_blocks = receipt.new_blocks,
            "upload stored"
        );

        return Ok(Json(UploadResponse {
            status: "File indexed and stored",
            blocks: receipt.blocks,
        }));
    }

    Err(HttpError::NoFile)
}

/// Report a body that failed mid-stream with the multipart extractor's
/// status rather than as a storage fault.
fn upload_error(err: EngineError) -> HttpError {
    match multipart_cause(&err) {
        Some(cause) => HttpError::from(cause),
        None => HttpError::Engine(err),
    }
}

fn multipart_cause(err: &EngineError) -> Option<&MultipartError> {
    let mut source = std::error::Error::source(err);
    while let Some(e) = source {
        let cause = e
            .downcast_ref::<std::io::Error>()
            .and_then(|io| io.get_ref())
            .and_then(|inner| inner.downcast_ref::<MultipartError>());
        if cause.is_some() {
            return cause;
        }
        source = e.source();
    }
    None
}

/// Strip any client-side directory from an uploaded filename.
fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

// -----------------------------------------------------------------------
// GET /search?q=
// -----------------------------------------------------------------------

#[derive(Deserialize)]
pub(crate) struct SearchParams {
    q: Option<String>,
}

/// Response body for `GET /search`.
#[derive(Serialize)]
pub(crate) struct SearchResponse {
    pub keyword: String,
    pub found_in: Vec<String>,
    pub count: usize,
}

/// Look up which files contained a keyword.
pub(crate) async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, HttpError> {
    let query = params.q.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(HttpError::MissingQuery);
    }

    let result = state.node.search(&query);
    Ok(Json(SearchResponse {
        keyword: result.keyword,
        found_in: result.filenames,
        count: result.count,
    }))
}

// -----------------------------------------------------------------------
// GET /download/{filename}
// -----------------------------------------------------------------------

/// Reconstruct a file and return it as an attachment.
///
/// The whole file is assembled before the response starts, so a missing
/// or corrupt block yields an error status instead of a truncated body.
#[tracing::instrument(skip(state))]
pub(crate) async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, HttpError> {
    let data = state.node.retrieve(&filename).await?;

    let disposition = HeaderValue::try_from(content_disposition(&filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}

/// Build a `Content-Disposition` value, using the RFC 5987 form for
/// non-ASCII names.
fn content_disposition(filename: &str) -> String {
    if filename.is_ascii() {
        let escaped = filename.replace('\\', "\\\\").replace('"', "\\\"");
        return format!("attachment; filename=\"{escaped}\"");
    }

    let mut encoded = String::with_capacity(filename.len() * 3);
    for byte in filename.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    format!("attachment; filename*=UTF-8''{encoded}")
}
