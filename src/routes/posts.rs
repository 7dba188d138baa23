use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extractors::{JsonBody, QueryParams};
use crate::ids;
use crate::models::{Comment, Post, PostStatus, TagsInput};
use crate::query::{self, PostFilter};
use crate::routes::{author_or_anonymous, required, timestamp, Ack, CommentResponse};
use crate::state::AppState;

// --- Requests ---

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    pub author: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<TagsInput>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePostRequest {
    pub author: Option<String>,
    #[serde(default)]
    pub updates: PostUpdate,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<TagsInput>,
    pub status: Option<PostStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthorRequest {
    pub author: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentRequest {
    pub author: Option<String>,
    pub content: Option<String>,
}

// --- Responses ---

#[derive(Serialize)]
pub struct PostListResponse {
    pub success: bool,
    pub posts: Vec<Post>,
    pub count: usize,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct PostResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub post: Post,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct CreatePostResponse {
    pub success: bool,
    pub message: &'static str,
    pub post: Post,
    pub id: String,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct LikeResponse {
    pub success: bool,
    pub likes: u64,
    pub message: &'static str,
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route(
            "/api/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/api/posts/{id}/like", post(like_post))
        .route("/api/posts/{id}/comments", post(add_comment))
}

// --- Handlers ---

async fn list_posts(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<PostFilter>,
) -> AppResult<Json<PostListResponse>> {
    let posts = state
        .store
        .read(|doc| query::list_posts(doc.posts.values(), &filter))
        .await?;
    tracing::debug!("Listed {} posts with {:?}", posts.len(), filter);

    Ok(Json(PostListResponse {
        success: true,
        count: posts.len(),
        posts,
        timestamp: timestamp(),
    }))
}

/// Fetching a post counts as a view.
async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PostResponse>> {
    let post = state
        .store
        .update(|doc| -> AppResult<Post> {
            let post = doc.posts.get_mut(&id).ok_or(AppError::NotFound("Post"))?;
            post.views += 1;
            Ok(post.clone())
        })
        .await?;

    Ok(Json(PostResponse {
        success: true,
        message: None,
        post,
        timestamp: timestamp(),
    }))
}

async fn create_post(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreatePostRequest>,
) -> AppResult<Json<CreatePostResponse>> {
    let missing = "Title and content are required";
    let title = required(req.title.as_deref(), missing)?;
    let content = required(req.content.as_deref(), missing)?;
    let tags = req.tags.map(TagsInput::normalize).unwrap_or_default();
    let named_author = req
        .author
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string);

    let post = state
        .store
        .update(|doc| -> AppResult<Post> {
            let author = match named_author {
                Some(author) => {
                    let limit = doc.config.max_posts_per_user as usize;
                    if doc.live_post_count(&author) >= limit {
                        return Err(AppError::Validation(format!(
                            "Post limit of {} reached for {}",
                            limit, author
                        )));
                    }
                    author
                }
                None if doc.config.allow_public_posts => author_or_anonymous(None),
                None => return Err(AppError::Validation("Author is required".into())),
            };

            let status = if doc.config.require_approval {
                PostStatus::Pending
            } else {
                PostStatus::Published
            };
            let post = Post::new(
                ids::generate_id(&author),
                &author,
                &title,
                &content,
                tags,
                status,
            );
            doc.posts.insert(post.id.clone(), post.clone());
            Ok(post)
        })
        .await?;

    tracing::info!("Post created: {} by {}", post.id, post.author);

    Ok(Json(CreatePostResponse {
        success: true,
        message: "Post created successfully!",
        id: post.id.clone(),
        post,
        timestamp: timestamp(),
    }))
}

async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdatePostRequest>,
) -> AppResult<Json<PostResponse>> {
    let caller = state.caller(&required(req.author.as_deref(), "Author is required")?);

    let updates = req.updates;
    let title = updates
        .title
        .map(|t| required(Some(t.as_str()), "Title cannot be empty"))
        .transpose()?;
    let content = updates
        .content
        .map(|c| required(Some(c.as_str()), "Content cannot be empty"))
        .transpose()?;
    let tags = updates.tags.map(TagsInput::normalize);
    let status = updates.status;

    let post = state
        .store
        .update(|doc| -> AppResult<Post> {
            let post = doc.posts.get_mut(&id).ok_or(AppError::NotFound("Post"))?;
            if !caller.can_modify(&post.author) {
                return Err(AppError::Forbidden);
            }

            if let Some(title) = title {
                post.title = title;
            }
            if let Some(content) = content {
                post.content = content;
            }
            if let Some(tags) = tags {
                post.tags = tags;
            }
            if let Some(status) = status {
                post.status = status;
            }
            post.updated = Some(Utc::now());
            Ok(post.clone())
        })
        .await?;

    tracing::info!("Post {} updated by {}", post.id, caller.name());

    Ok(Json(PostResponse {
        success: true,
        message: Some("Post updated successfully"),
        post,
        timestamp: timestamp(),
    }))
}

async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<AuthorRequest>,
) -> AppResult<Json<Ack>> {
    let caller = state.caller(&required(req.author.as_deref(), "Author is required")?);

    state
        .store
        .update(|doc| -> AppResult<()> {
            let post = doc.posts.get_mut(&id).ok_or(AppError::NotFound("Post"))?;
            if !caller.can_modify(&post.author) {
                return Err(AppError::Forbidden);
            }
            post.soft_delete(caller.name());
            Ok(())
        })
        .await?;

    tracing::info!("Post {} soft-deleted by {}", id, caller.name());
    Ok(Json(Ack::new("Post deleted successfully")))
}

async fn like_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<LikeResponse>> {
    let likes = state
        .store
        .update(|doc| -> AppResult<u64> {
            let post = doc.posts.get_mut(&id).ok_or(AppError::NotFound("Post"))?;
            post.likes += 1;
            Ok(post.likes)
        })
        .await?;

    tracing::info!("Post {} liked, total: {}", id, likes);

    Ok(Json(LikeResponse {
        success: true,
        likes,
        message: "Post liked!",
    }))
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
            let post = doc.posts.get_mut(&id).ok_or(AppError::NotFound("Post"))?;
            post.comments.push(comment.clone());
            Ok(comment)
        })
        .await?;

    tracing::info!("Comment added to post {} by {}", id, comment.author);
    Ok(Json(CommentResponse::new(comment)))
}
