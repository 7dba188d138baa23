use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extractors::{JsonBody, UserId};
use crate::ids;
use crate::models::{Member, ProjectStatus};
use crate::routes::required;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub institution: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: Member,
}

#[derive(Serialize)]
pub struct ProjectRef {
    pub id: String,
    pub title: String,
    pub status: ProjectStatus,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: Member,
    pub projects: Vec<ProjectRef>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/user", get(current_user))
}

/// Creates the member on first login. Only records who is acting; nothing is
/// authenticated.
async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let name = required(req.name.as_deref(), "Name is required")?;
    let id = ids::member_id(&name);
    if id.is_empty() {
        return Err(AppError::Validation(
            "Name must contain letters or digits".into(),
        ));
    }

    let user = state
        .store
        .update(|doc| -> AppResult<Member> {
            let member = doc
                .members
                .entry(id.clone())
                .or_insert_with(|| Member::new(id.clone(), &name));
            member.apply_profile(req.role.as_deref(), req.institution.as_deref());
            member.last_login = Some(Utc::now());
            Ok(member.clone())
        })
        .await?;

    tracing::info!("{} logged in", user.id);

    Ok(Json(LoginResponse {
        success: true,
        user,
    }))
}

async fn current_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> AppResult<Json<UserResponse>> {
    let (user, projects) = state
        .store
        .read(|doc| {
            doc.members.get(&id).map(|member| {
                let projects: Vec<ProjectRef> = member
                    .projects
                    .iter()
                    .filter_map(|pid| doc.projects.get(pid))
                    .filter(|p| !p.is_deleted())
                    .map(|p| ProjectRef {
                        id: p.id.clone(),
                        title: p.title.clone(),
                        status: p.status,
                    })
                    .collect();
                (member.clone(), projects)
            })
        })
        .await?
        .ok_or(AppError::NotFound("User"))?;

    Ok(Json(UserResponse {
        success: true,
        user,
        projects,
    }))
}
