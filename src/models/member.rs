use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_role() -> String {
    "researcher".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub institution: String,
    /// Project ids this member works on. Not ownership.
    #[serde(default)]
    pub projects: Vec<String>,
    pub joined_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl Member {
    pub fn new(id: String, name: &str) -> Self {
        Self {
            id,
            name: name.trim().to_string(),
            role: default_role(),
            institution: String::new(),
            projects: Vec::new(),
            joined_at: Utc::now(),
            last_login: None,
        }
    }

    pub fn link_project(&mut self, project_id: &str) {
        if !self.projects.iter().any(|p| p == project_id) {
            self.projects.push(project_id.to_string());
        }
    }

    /// Overwrites role and institution only when a non-blank value is given.
    pub fn apply_profile(&mut self, role: Option<&str>, institution: Option<&str>) {
        if let Some(role) = role.map(str::trim).filter(|r| !r.is_empty()) {
            self.role = role.to_string();
        }
        if let Some(inst) = institution.map(str::trim).filter(|i| !i.is_empty()) {
            self.institution = inst.to_string();
        }
    }
}
