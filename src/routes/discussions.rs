use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extractors::{JsonBody, QueryParams};
use crate::ids;
use crate::models::{Comment, Discussion, TagsInput, Vote};
use crate::query::{self, DiscussionFilter};
use crate::routes::posts::CommentRequest;
use crate::routes::{author_or_anonymous, required, timestamp, CommentResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateDiscussionRequest {
    pub project_id: Option<String>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<TagsInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VoteRequest {
    pub user_id: Option<String>,
    pub vote: Option<Vote>,
}

#[derive(Serialize)]
pub struct DiscussionListResponse {
    pub success: bool,
    pub discussions: Vec<Discussion>,
    pub count: usize,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct DiscussionResponse {
    pub success: bool,
    pub discussion: Discussion,
}

#[derive(Serialize)]
pub struct CreateDiscussionResponse {
    pub success: bool,
    pub discussion: Discussion,
    pub id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub success: bool,
    pub upvotes: u64,
    pub downvotes: u64,
    pub score: i64,
    pub vote: Vote,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_vote: Option<Vote>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/discussions",
            get(list_discussions).post(create_discussion),
        )
        .route("/api/discussions/{id}", get(get_discussion))
        .route("/api/discussions/{id}/vote", post(cast_vote))
        .route("/api/discussions/{id}/comments", post(add_comment))
}

async fn list_discussions(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<DiscussionFilter>,
) -> AppResult<Json<DiscussionListResponse>> {
    let discussions = state
        .store
        .read(|doc| query::list_discussions(doc.discussions.values(), &filter))
        .await?;

    Ok(Json(DiscussionListResponse {
        success: true,
        count: discussions.len(),
        discussions,
        timestamp: timestamp(),
    }))
}

async fn get_discussion(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DiscussionResponse>> {
    let discussion = state
        .store
        .read(|doc| doc.discussions.get(&id).cloned())
        .await?
        .ok_or(AppError::NotFound("Discussion"))?;

    Ok(Json(DiscussionResponse {
        success: true,
        discussion,
    }))
}

async fn create_discussion(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateDiscussionRequest>,
) -> AppResult<Json<CreateDiscussionResponse>> {
    let missing = "Project, title and content are required";
    let project_id = required(req.project_id.as_deref(), missing)?;
    let title = required(req.title.as_deref(), missing)?;
    let content = required(req.content.as_deref(), missing)?;
    let author = author_or_anonymous(req.author.as_deref());

    let mut discussion =
        Discussion::new(ids::generate_id(&author), &project_id, &author, &title, &content);
    discussion.tags = req.tags.map(TagsInput::normalize).unwrap_or_default();

    let discussion = state
        .store
        .update(|doc| -> AppResult<Discussion> {
            if !doc.projects.contains_key(&project_id) {
                return Err(AppError::NotFound("Project"));
            }
            doc.discussions
                .insert(discussion.id.clone(), discussion.clone());
            Ok(discussion)
        })
        .await?;

    tracing::info!(
        "Discussion {} opened on project {} by {}",
        discussion.id,
        discussion.project_id,
        discussion.author
    );

    Ok(Json(CreateDiscussionResponse {
        success: true,
        id: discussion.id.clone(),
        discussion,
    }))
}

/// One vote per user. Voting again replaces the earlier vote.
async fn cast_vote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<VoteRequest>,
) -> AppResult<Json<VoteResponse>> {
    let user_id = required(req.user_id.as_deref(), "User id and vote are required")?;
    let vote = req
        .vote
        .ok_or_else(|| AppError::Validation("User id and vote are required".into()))?;

    let response = state
        .store
        .update(|doc| -> AppResult<VoteResponse> {
            let discussion = doc
                .discussions
                .get_mut(&id)
                .ok_or(AppError::NotFound("Discussion"))?;
            let previous_vote = discussion.cast_vote(&user_id, vote);
            Ok(VoteResponse {
                success: true,
                upvotes: discussion.upvotes,
                downvotes: discussion.downvotes,
                score: discussion.score(),
                vote,
                previous_vote,
            })
        })
        .await?;

    tracing::info!(
        "{} voted {:?} on discussion {} (score {})",
        user_id,
        vote,
        id,
        response.score
    );

    Ok(Json(response))
}

async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<CommentRequest>,
) -> AppResult<Json<CommentResponse>> {
    let content = required(req.content.as_deref(), "Comment content is required")?;
    let comment = Comment::new(&author_or_anonymous(req.author.as_deref()), &content);

    let comment = state
        .store
        .update(|doc| -> AppResult<Comment> {
            let discussion = doc
                .discussions
                .get_mut(&id)
                .ok_or(AppError::NotFound("Discussion"))?;
            discussion.comments.push(comment.clone());
            discussion.updated_at = comment.date;
            Ok(comment)
        })
        .await?;

    tracing::info!("Comment added to discussion {} by {}", id, comment.author);
    Ok(Json(CommentResponse::new(comment)))
}
