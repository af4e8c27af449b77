//! HTTP routes: CSV generation, artifact downloads, and auxiliary assets.

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use csvgen::config::UPLOADS_SEGMENT;
use csvgen::error::GenerateError;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tracing::error;

use crate::request_log::log_request;
use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let config = Arc::clone(&state.config);
    let static_dir = &config.static_dir;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/generate-csv", post(generate_csv))
        .route("/health", get(health))
        .route_service(
            "/.well-known/ai-plugin.json",
            ServeFile::new(static_dir.join("ai-plugin.json")),
        )
        .route_service("/openapi.yaml", ServeFile::new(static_dir.join("openapi.yaml")))
        .route_service("/logo.png", ServeFile::new(static_dir.join("logo.png")))
        .route_service("/legal", ServeFile::new(static_dir.join("legal.txt")))
        .nest_service(
            &format!("/{UPLOADS_SEGMENT}"),
            ServeDir::new(&config.upload_dir),
        )
        .with_state(state);

    if config.debug {
        app = app.layer(middleware::from_fn_with_state(
            config.log_dir.clone(),
            log_request,
        ));
    }

    app.layer(cors)
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    url: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// Request-path failures, rendered as `{"error": "..."}`.
#[derive(Debug)]
enum ApiError {
    Generate(GenerateError),
    /// The detached write task died before reporting back.
    Aborted,
}

impl From<GenerateError> for ApiError {
    fn from(err: GenerateError) -> Self {
        Self::Generate(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Generate(err) => {
                let status = match err {
                    GenerateError::Validation(_) => StatusCode::BAD_REQUEST,
                    GenerateError::Storage(inner) => {
                        error!(error = %inner, "failed to store artifact");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, err.public_message())
            }
            Self::Aborted => {
                error!("artifact write task aborted");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    csvgen::error::STORAGE_FAILURE_MESSAGE,
                )
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// POST /generate-csv - write `{"data": [[...], ...]}` to a CSV artifact.
///
/// The write runs in its own task so a client that disconnects does not cut
/// it short; the response is sent only after the file is synced.
async fn generate_csv(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GenerateResponse>, ApiError> {
    let writer = Arc::clone(&state.writer);
    let artifact = tokio::spawn(async move { writer.generate_from_body(&body).await })
        .await
        .map_err(|_| ApiError::Aborted)??;

    Ok(Json(GenerateResponse { url: artifact.url }))
}
