use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Discussion, Member, Post, Project};

pub const SCHEMA_VERSION: &str = "1.0.0";

/// The whole persisted dataset. Read and rewritten as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub posts: BTreeMap<String, Post>,
    #[serde(default)]
    pub projects: BTreeMap<String, Project>,
    #[serde(default)]
    pub discussions: BTreeMap<String, Discussion>,
    #[serde(default, alias = "users")]
    pub members: BTreeMap<String, Member>,
    #[serde(default)]
    pub config: SiteConfig,
    #[serde(default)]
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteConfig {
    pub allow_public_posts: bool,
    pub require_approval: bool,
    pub max_posts_per_user: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            allow_public_posts: true,
            require_approval: false,
            max_posts_per_user: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub created_at: DateTime<Utc>,
    pub version: String,
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            created_at: Utc::now(),
            version: SCHEMA_VERSION.to_string(),
        }
    }
}

impl Document {
    pub fn empty() -> Self {
        Self {
            posts: BTreeMap::new(),
            projects: BTreeMap::new(),
            discussions: BTreeMap::new(),
            members: BTreeMap::new(),
            config: SiteConfig::default(),
            meta: Meta::default(),
        }
    }

    /// Posts by `author` that still count against the per-user limit.
    pub fn live_post_count(&self, author: &str) -> usize {
        self.posts
            .values()
            .filter(|p| p.author == author && !p.is_deleted())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_users_key_is_read_as_members() {
        let json = r#"{
            "posts": {},
            "users": {
                "ada": { "id": "ada", "name": "Ada", "joinedAt": "2024-01-01T00:00:00Z" }
            },
            "config": { "allowPublicPosts": true, "requireApproval": true, "maxPostsPerUser": 5 },
            "meta": { "createdAt": "2024-01-01T00:00:00Z", "version": "1.0.0" }
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert!(doc.members.contains_key("ada"));
        assert!(doc.config.require_approval);
        assert_eq!(doc.config.max_posts_per_user, 5);
        assert!(doc.projects.is_empty());
    }

    #[test]
    fn missing_config_fields_take_defaults() {
        let json = r#"{ "config": { "requireApproval": true } }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert!(doc.config.allow_public_posts);
        assert!(doc.config.require_approval);
        assert_eq!(doc.config.max_posts_per_user, 100);
    }

    #[test]
    fn document_writes_superset_keys() {
        let value = serde_json::to_value(Document::empty()).unwrap();
        for key in ["posts", "projects", "discussions", "members", "config", "meta"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
    }
}
