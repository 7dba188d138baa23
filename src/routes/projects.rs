use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extractors::{JsonBody, QueryParams};
use crate::ids;
use crate::models::{Member, Milestone, MilestoneStatus, Priority, Project, ProjectStatus, TagsInput};
use crate::query::{self, ProjectFilter};
use crate::routes::posts::AuthorRequest;
use crate::routes::{required, timestamp, Ack};
use crate::state::AppState;

// --- Requests ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProjectRequest {
    pub lead: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub phase: Option<String>,
    pub tags: Option<TagsInput>,
    pub institutions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProjectRequest {
    pub author: Option<String>,
    #[serde(default)]
    pub updates: ProjectUpdate,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub phase: Option<String>,
    pub tags: Option<TagsInput>,
    pub institutions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TeamMemberRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub institution: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MilestoneRequest {
    pub title: Option<String>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MilestoneUpdateRequest {
    pub status: Option<MilestoneStatus>,
}

// --- Responses ---

#[derive(Serialize)]
pub struct ProjectListResponse {
    pub success: bool,
    pub projects: Vec<Project>,
    pub count: usize,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct ProjectResponse {
    pub success: bool,
    pub project: Project,
}

#[derive(Serialize)]
pub struct CreateProjectResponse {
    pub success: bool,
    pub message: &'static str,
    pub project: Project,
    pub id: String,
}

#[derive(Serialize)]
pub struct TeamResponse {
    pub success: bool,
    pub team: Vec<Member>,
}

#[derive(Serialize)]
pub struct AddTeamMemberResponse {
    pub success: bool,
    pub member: Member,
    pub team: Vec<Member>,
}

#[derive(Serialize)]
pub struct MilestoneResponse {
    pub success: bool,
    pub milestone: Milestone,
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/api/projects/{id}/team", get(list_team).post(add_team_member))
        .route("/api/projects/{id}/milestones", post(add_milestone))
        .route(
            "/api/projects/{id}/milestones/{milestone_id}",
            put(update_milestone),
        )
}

/// Resolves team member ids, skipping ids with no member record.
fn resolve_team(members: &BTreeMap<String, Member>, team: &[String]) -> Vec<Member> {
    team.iter()
        .filter_map(|id| members.get(id))
        .cloned()
        .collect()
}

fn clean_institutions(institutions: Vec<String>) -> Vec<String> {
    TagsInput::List(institutions).normalize()
}

// --- Handlers ---

async fn list_projects(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<ProjectFilter>,
) -> AppResult<Json<ProjectListResponse>> {
    let projects = state
        .store
        .read(|doc| query::list_projects(doc.projects.values(), &filter))
        .await?;

    Ok(Json(ProjectListResponse {
        success: true,
        count: projects.len(),
        projects,
        timestamp: timestamp(),
    }))
}

async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProjectResponse>> {
    let project = state
        .store
        .read(|doc| doc.projects.get(&id).cloned())
        .await?
        .ok_or(AppError::NotFound("Project"))?;

    Ok(Json(ProjectResponse {
        success: true,
        project,
    }))
}

async fn create_project(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateProjectRequest>,
) -> AppResult<Json<CreateProjectResponse>> {
    let missing = "Lead, title and description are required";
    let lead = required(req.lead.as_deref(), missing)?;
    let title = required(req.title.as_deref(), missing)?;
    let description = required(req.description.as_deref(), missing)?;

    let mut project = Project::new(ids::generate_id(&lead), &lead, &title, &description);
    if let Some(priority) = req.priority {
        project.priority = priority;
    }
    if let Some(phase) = req.phase.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        project.phase = phase.to_string();
    }
    project.tags = req.tags.map(TagsInput::normalize).unwrap_or_default();
    project.institutions = req.institutions.map(clean_institutions).unwrap_or_default();

    let lead_id = ids::member_id(&lead);
    let project = state
        .store
        .update(|doc| -> AppResult<Project> {
            if let Some(member) = doc.members.get_mut(&lead_id) {
                member.link_project(&project.id);
                project.add_to_team(&lead_id);
            }
            doc.projects.insert(project.id.clone(), project.clone());
            Ok(project)
        })
        .await?;

    tracing::info!("Project created: {} led by {}", project.id, project.lead);

    Ok(Json(CreateProjectResponse {
        success: true,
        message: "Project created successfully",
        id: project.id.clone(),
        project,
    }))
}

async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateProjectRequest>,
) -> AppResult<Json<ProjectResponse>> {
    let caller = state.caller(&required(req.author.as_deref(), "Author is required")?);

    let updates = req.updates;
    let title = updates
        .title
        .map(|t| required(Some(t.as_str()), "Title cannot be empty"))
        .transpose()?;
    let description = updates
        .description
        .map(|d| required(Some(d.as_str()), "Description cannot be empty"))
        .transpose()?;
    let phase = updates
        .phase
        .map(|p| required(Some(p.as_str()), "Phase cannot be empty"))
        .transpose()?;
    let tags = updates.tags.map(TagsInput::normalize);
    let institutions = updates.institutions.map(clean_institutions);
    let (status, priority) = (updates.status, updates.priority);

    let project = state
        .store
        .update(|doc| -> AppResult<Project> {
            let project = doc
                .projects
                .get_mut(&id)
                .ok_or(AppError::NotFound("Project"))?;
            if !caller.can_modify(&project.lead) {
                return Err(AppError::Forbidden);
            }

            if let Some(title) = title {
                project.title = title;
            }
            if let Some(description) = description {
                project.description = description;
            }
            if let Some(phase) = phase {
                project.phase = phase;
            }
            if let Some(tags) = tags {
                project.tags = tags;
            }
            if let Some(institutions) = institutions {
                project.institutions = institutions;
            }
            if let Some(status) = status {
                project.status = status;
            }
            if let Some(priority) = priority {
                project.priority = priority;
            }
            project.touch();
            Ok(project.clone())
        })
        .await?;

    tracing::info!("Project {} updated by {}", project.id, caller.name());

    Ok(Json(ProjectResponse {
        success: true,
        project,
    }))
}

async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<AuthorRequest>,
) -> AppResult<Json<Ack>> {
    let caller = state.caller(&required(req.author.as_deref(), "Author is required")?);

    state
        .store
        .update(|doc| -> AppResult<()> {
            let project = doc
                .projects
                .get_mut(&id)
                .ok_or(AppError::NotFound("Project"))?;
            if !caller.can_modify(&project.lead) {
                return Err(AppError::Forbidden);
            }
            project.soft_delete(caller.name());
            Ok(())
        })
        .await?;

    tracing::info!("Project {} soft-deleted by {}", id, caller.name());
    Ok(Json(Ack::new("Project deleted successfully")))
}

async fn list_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<TeamResponse>> {
    let team = state
        .store
        .read(|doc| {
            doc.projects
                .get(&id)
                .map(|p| resolve_team(&doc.members, &p.team))
        })
        .await?
        .ok_or(AppError::NotFound("Project"))?;

    Ok(Json(TeamResponse {
        success: true,
        team,
    }))
}

async fn add_team_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<TeamMemberRequest>,
) -> AppResult<Json<AddTeamMemberResponse>> {
    let name = required(req.name.as_deref(), "Member name is required")?;
    let member_id = ids::member_id(&name);
    if member_id.is_empty() {
        return Err(AppError::Validation(
            "Member name must contain letters or digits".into(),
        ));
    }

    let (member, team) = state
        .store
        .update(|doc| -> AppResult<(Member, Vec<Member>)> {
            let project = doc
                .projects
                .get_mut(&id)
                .ok_or(AppError::NotFound("Project"))?;
            project.add_to_team(&member_id);
            if let Some(institution) = req.institution.as_deref() {
                project.add_institution(institution);
            }
            project.touch();
            let team_ids = project.team.clone();

            let member = doc
                .members
                .entry(member_id.clone())
                .or_insert_with(|| Member::new(member_id.clone(), &name));
            member.apply_profile(req.role.as_deref(), req.institution.as_deref());
            member.link_project(&id);
            let member = member.clone();

            Ok((member, resolve_team(&doc.members, &team_ids)))
        })
        .await?;

    tracing::info!("{} joined project {}", member.id, id);

    Ok(Json(AddTeamMemberResponse {
        success: true,
        member,
        team,
    }))
}

async fn add_milestone(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<MilestoneRequest>,
) -> AppResult<Json<MilestoneResponse>> {
    let title = required(req.title.as_deref(), "Milestone title is required")?;
    let milestone = Milestone::new(&title, req.due_date);

    let milestone = state
        .store
        .update(|doc| -> AppResult<Milestone> {
            let project = doc
                .projects
                .get_mut(&id)
                .ok_or(AppError::NotFound("Project"))?;
            project.milestones.push(milestone.clone());
            project.touch();
            Ok(milestone)
        })
        .await?;

    tracing::info!("Milestone {} added to project {}", milestone.id, id);

    Ok(Json(MilestoneResponse {
        success: true,
        milestone,
    }))
}

async fn update_milestone(
    State(state): State<AppState>,
    Path((id, milestone_id)): Path<(String, String)>,
    JsonBody(req): JsonBody<MilestoneUpdateRequest>,
) -> AppResult<Json<MilestoneResponse>> {
    let status = req
        .status
        .ok_or_else(|| AppError::Validation("Milestone status is required".into()))?;

    let milestone = state
        .store
        .update(|doc| -> AppResult<Milestone> {
            let project = doc
                .projects
                .get_mut(&id)
                .ok_or(AppError::NotFound("Project"))?;
            let milestone = project
                .milestone_mut(&milestone_id)
                .ok_or(AppError::NotFound("Milestone"))?;
            milestone.status = status;
            let milestone = milestone.clone();
            project.touch();
            Ok(milestone)
        })
        .await?;

    tracing::info!(
        "Milestone {} of project {} is now {}",
        milestone_id,
        id,
        milestone.status.as_str()
    );

    Ok(Json(MilestoneResponse {
        success: true,
        milestone,
    }))
}
