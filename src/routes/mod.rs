pub mod analytics;
pub mod discussions;
pub mod health;
pub mod members;
pub mod posts;
pub mod projects;

use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{AppError, AppResult};
use crate::models::Comment;
use crate::state::AppState;

/// The full HTTP surface with its middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(posts::router())
        .merge(projects::router())
        .merge(discussions::router())
        .merge(members::router())
        .merge(analytics::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Envelope for operations that only report success.
#[derive(Serialize)]
pub struct Ack {
    pub success: bool,
    pub message: &'static str,
}

impl Ack {
    pub fn new(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

#[derive(Serialize)]
pub struct CommentResponse {
    pub success: bool,
    pub comment: Comment,
    pub message: &'static str,
}

impl CommentResponse {
    pub fn new(comment: Comment) -> Self {
        Self {
            success: true,
            comment,
            message: "Comment added successfully",
        }
    }
}

pub(crate) fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Trimmed value of a required text field, or a validation error with `message`.
pub(crate) fn required(value: Option<&str>, message: &str) -> AppResult<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::Validation(message.to_string()))
}

/// Author names fall back to `anonymous` when absent or blank.
pub(crate) fn author_or_anonymous(author: Option<&str>) -> String {
    author
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or("anonymous")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required(Some("  x "), "msg").unwrap(), "x");
        assert!(matches!(
            required(Some("   "), "msg"),
            Err(AppError::Validation(m)) if m == "msg"
        ));
        assert!(required(None, "msg").is_err());
    }

    #[test]
    fn blank_author_is_anonymous() {
        assert_eq!(author_or_anonymous(None), "anonymous");
        assert_eq!(author_or_anonymous(Some(" ")), "anonymous");
        assert_eq!(author_or_anonymous(Some("ann")), "ann");
    }
}
