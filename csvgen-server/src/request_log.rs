//! Middleware that records every request as a JSON file when `DEBUG` is set.

use std::collections::BTreeMap;
use std::path::PathBuf;

use axum::body::{Body, to_bytes};
use axum::extract::{Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use csvgen::io::request_log::{RequestLogEntry, write_request_log};
use tracing::{debug, warn};

/// Largest body buffered for logging; matches axum's default body limit.
const MAX_LOGGED_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Buffer the body, hand a copy to a background log write, then continue
/// with the original request. Log failures never affect the response.
pub async fn log_request(
    State(log_dir): State<PathBuf>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_LOGGED_BODY_BYTES)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;

    let query = Query::<BTreeMap<String, String>>::try_from_uri(&parts.uri)
        .map(|Query(query)| query)
        .unwrap_or_default();
    let entry =
        RequestLogEntry::received_now(parts.method.as_str(), parts.uri.path(), &bytes, query);

    tokio::task::spawn_blocking(move || match write_request_log(&log_dir, &entry) {
        Ok(path) => debug!(path = %path.display(), "request logged"),
        Err(err) => warn!("failed to write request log: {err:#}"),
    });

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}
