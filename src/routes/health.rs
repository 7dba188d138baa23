use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::query::PostSummary;
use crate::routes::timestamp;
use crate::state::AppState;
use crate::store::StoreError;

const ENDPOINTS: &[&str] = &[
    "/api/posts",
    "/api/stats",
    "/api/projects",
    "/api/discussions",
    "/api/analytics",
    "/api/search",
    "/api/login",
    "/api/user",
    "/api/debug",
    "/health",
];

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    pub endpoints: &'static [&'static str],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplePost {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub status: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugResponse {
    pub success: bool,
    pub file_exists: bool,
    pub post_count: usize,
    pub project_count: usize,
    pub discussion_count: usize,
    pub member_count: usize,
    /// Size of the document serialized without whitespace.
    pub file_size: usize,
    pub sample_posts: Vec<SamplePost>,
    pub server_time: String,
    pub version: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugFailure {
    pub success: bool,
    pub error: String,
    pub file_exists: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/debug", get(debug))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: timestamp(),
        version: env!("CARGO_PKG_VERSION"),
        endpoints: ENDPOINTS,
    })
}

/// Store diagnostics. Failures keep the error envelope but also say whether
/// the store file is present.
async fn debug(State(state): State<AppState>) -> Response {
    let file_exists = match state.store.exists().await {
        Ok(exists) => exists,
        Err(err) => return AppError::from(err).into_response(),
    };

    match debug_report(&state, file_exists).await {
        Ok(report) => Json(report).into_response(),
        Err(err) => {
            tracing::error!("Debug report failed: {}", err);
            let body = DebugFailure {
                success: false,
                error: err.to_string(),
                file_exists,
            };
            (err.status(), Json(body)).into_response()
        }
    }
}

async fn debug_report(state: &AppState, file_exists: bool) -> AppResult<DebugResponse> {
    let doc = state.store.load().await?;
    let file_size = serde_json::to_vec(&doc)
        .map_err(StoreError::from)?
        .len();

    let sample_posts = doc
        .posts
        .values()
        .take(3)
        .map(|p| SamplePost {
            summary: PostSummary {
                id: p.id.clone(),
                title: p.title.clone(),
                author: p.author.clone(),
            },
            status: p.status.as_str(),
        })
        .collect();

    Ok(DebugResponse {
        success: true,
        file_exists,
        post_count: doc.posts.len(),
        project_count: doc.projects.len(),
        discussion_count: doc.discussions.len(),
        member_count: doc.members.len(),
        file_size,
        sample_posts,
        server_time: timestamp(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
