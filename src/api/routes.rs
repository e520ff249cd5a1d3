use crate::media::{MediaError, MediaService, VideoInfo};
use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub media: Arc<MediaService>,
}

#[derive(Debug, Deserialize)]
pub struct InfoRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    #[serde(default)]
    pub url: String,
    pub quality: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    // The info and download endpoints name this field differently
    detail: Option<(&'static str, String)>,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            detail: None,
        }
    }

    fn internal(message: impl Into<String>, key: &'static str, detail: String) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            detail: Some((key, detail)),
        }
    }

    fn from_info(err: MediaError) -> Self {
        if err.is_client_error() {
            return Self::bad_request(err.to_string());
        }

        error!("Failed to fetch video info: {}", err);
        Self::internal(
            "Internal Server Error",
            "details",
            format!("Failed to fetch video info: {}", err.detail()),
        )
    }

    fn from_download(err: MediaError) -> Self {
        if err.is_client_error() {
            return Self::bad_request(err.to_string());
        }

        error!("Download failed: {}", err);
        let message = match &err {
            MediaError::ArtifactMissing(_) => "Downloaded file not found",
            _ => "Failed to download video",
        };
        Self::internal(message, "detail", err.detail())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = Map::new();
        body.insert("message".to_string(), Value::String(self.message));
        if let Some((key, detail)) = self.detail {
            body.insert(key.to_string(), Value::String(detail));
        }

        (self.status, Json(Value::Object(body))).into_response()
    }
}

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/Info", post(video_info))
        .route("/api/info", post(video_info))
        .route("/api/Download", get(download))
        .route("/api/download", get(download))
        .with_state(state)
        .layer(cors)
}

pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .expose_headers([CONTENT_DISPOSITION]);

    if allowed_origins.is_empty() || allowed_origins.iter().any(|origin| origin == "*") {
        info!("CORS allows any origin");
        return Ok(layer.allow_origin(Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin.trim_end_matches('/'))
                .with_context(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    info!("CORS allow-list loaded with {} origin(s)", origins.len());
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn video_info(
    State(state): State<AppState>,
    request: Result<Json<InfoRequest>, JsonRejection>,
) -> Result<Json<VideoInfo>, ApiError> {
    let Json(request) = request.map_err(|rejection| {
        warn!("Rejected info request body: {}", rejection.body_text());
        ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    state
        .media
        .video_info(&request.url)
        .await
        .map(Json)
        .map_err(ApiError::from_info)
}

async fn download(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    if query.url.trim().is_empty() {
        return Err(ApiError::bad_request("URL is required"));
    }

    let media = state
        .media
        .download(&query.url, query.quality.as_deref())
        .await
        .map_err(ApiError::from_download)?;

    let headers = [
        (CONTENT_TYPE, media.content_type.to_string()),
        (
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", media.filename),
        ),
    ];

    Ok((headers, media.data).into_response())
}
