use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::extractors::QueryParams;
use crate::query::{self, BlogStats, ResearchAnalytics, SearchResults};
use crate::routes::{required, timestamp};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: BlogStats,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct AnalyticsResponse {
    pub success: bool,
    pub analytics: ResearchAnalytics,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub query: String,
    pub results: SearchResults,
    pub count: usize,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stats", get(stats))
        .route("/api/analytics", get(analytics))
        .route("/api/search", get(search))
}

async fn stats(State(state): State<AppState>) -> AppResult<Json<StatsResponse>> {
    let stats = state
        .store
        .read(|doc| query::blog_stats(doc, Utc::now()))
        .await?;
    tracing::debug!(
        "Stats: {} posts, {} views",
        stats.total_posts,
        stats.total_views
    );

    Ok(Json(StatsResponse {
        success: true,
        stats,
        timestamp: timestamp(),
    }))
}

async fn analytics(State(state): State<AppState>) -> AppResult<Json<AnalyticsResponse>> {
    let analytics = state.store.read(query::research_analytics).await?;

    Ok(Json(AnalyticsResponse {
        success: true,
        analytics,
        timestamp: timestamp(),
    }))
}

async fn search(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<SearchParams>,
) -> AppResult<Json<SearchResponse>> {
    let q = required(params.q.as_deref(), "Search query is required")?;
    let results = state
        .store
        .read(|doc| query::search_all(doc, &q))
        .await?;

    Ok(Json(SearchResponse {
        success: true,
        count: results.count(),
        query: q,
        results,
    }))
}
