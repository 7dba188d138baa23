use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Planning,
    Active,
    Completed,
    Deleted,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "planning",
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Deleted => "deleted",
        }
    }
}

/// Declaration order is the sort order: high ranks before medium before low.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MilestoneStatus {
    Pending,
    InProgress,
    Completed,
}

impl MilestoneStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneStatus::Pending => "pending",
            MilestoneStatus::InProgress => "in-progress",
            MilestoneStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub title: String,
    pub status: MilestoneStatus,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl Milestone {
    pub fn new(title: &str, due_date: Option<NaiveDate>) -> Self {
        Self {
            id: crate::ids::prefixed_id("milestone"),
            title: title.trim().to_string(),
            status: MilestoneStatus::Pending,
            date: Utc::now(),
            due_date,
        }
    }
}

fn default_phase() -> String {
    "ideation".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub lead: String,
    pub status: ProjectStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_phase")]
    pub phase: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub institutions: Vec<String>,
    /// Member ids. Weak references into the members map.
    #[serde(default)]
    pub team: Vec<String>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<String>,
}

impl Project {
    pub fn new(id: String, lead: &str, title: &str, description: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            lead: lead.to_string(),
            status: ProjectStatus::Planning,
            priority: Priority::default(),
            phase: default_phase(),
            tags: Vec::new(),
            institutions: Vec::new(),
            team: Vec::new(),
            milestones: Vec::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            deleted_by: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.status == ProjectStatus::Deleted
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn soft_delete(&mut self, by: &str) {
        let now = Utc::now();
        self.status = ProjectStatus::Deleted;
        self.deleted_at = Some(now);
        self.deleted_by = Some(by.to_string());
        self.updated_at = now;
    }

    /// Returns false when the member was already on the team.
    pub fn add_to_team(&mut self, member_id: &str) -> bool {
        if self.team.iter().any(|m| m == member_id) {
            return false;
        }
        self.team.push(member_id.to_string());
        true
    }

    pub fn add_institution(&mut self, institution: &str) {
        let institution = institution.trim();
        if !institution.is_empty() && !self.institutions.iter().any(|i| i == institution) {
            self.institutions.push(institution.to_string());
        }
    }

    pub fn milestone_mut(&mut self, milestone_id: &str) -> Option<&mut Milestone> {
        self.milestones.iter_mut().find(|m| m.id == milestone_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_orders_high_first() {
        let mut ps = vec![Priority::Low, Priority::High, Priority::Medium];
        ps.sort();
        assert_eq!(ps, vec![Priority::High, Priority::Medium, Priority::Low]);
    }

    #[test]
    fn milestone_status_uses_kebab_case() {
        let json = serde_json::to_string(&MilestoneStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        let parsed: MilestoneStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, MilestoneStatus::Completed);
    }

    #[test]
    fn team_membership_is_a_set() {
        let mut project = Project::new("p".into(), "ada", "T", "D");
        assert!(project.add_to_team("ada"));
        assert!(!project.add_to_team("ada"));
        assert_eq!(project.team, vec!["ada"]);
    }

    #[test]
    fn institutions_skip_blanks_and_duplicates() {
        let mut project = Project::new("p".into(), "ada", "T", "D");
        project.add_institution("MIT");
        project.add_institution(" MIT ");
        project.add_institution("");
        assert_eq!(project.institutions, vec!["MIT"]);
    }

    #[test]
    fn project_serializes_camel_case() {
        let project = Project::new("p".into(), "ada", "T", "D");
        let value = serde_json::to_value(&project).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("deletedAt").is_none());
        assert_eq!(value["priority"], "medium");
        assert_eq!(value["status"], "planning");
    }
}
