use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Comment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Pending,
    Published,
    Deleted,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Pending => "pending",
            PostStatus::Published => "published",
            PostStatus::Deleted => "deleted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub author: String,
    pub title: String,
    pub content: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: PostStatus,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<String>,
}

impl Post {
    pub fn new(
        id: String,
        author: &str,
        title: &str,
        content: &str,
        tags: Vec<String>,
        status: PostStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            author: author.to_string(),
            title: title.trim().to_string(),
            content: content.trim().to_string(),
            date: now.date_naive(),
            tags,
            status,
            views: 0,
            likes: 0,
            comments: Vec::new(),
            created: Some(now),
            updated: None,
            deleted_at: None,
            deleted_by: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.status == PostStatus::Deleted
    }

    pub fn soft_delete(&mut self, by: &str) {
        let now = Utc::now();
        self.status = PostStatus::Deleted;
        self.deleted_at = Some(now);
        self.deleted_by = Some(by.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&PostStatus::Published).unwrap();
        assert_eq!(json, "\"published\"");
        assert_eq!(PostStatus::Pending.as_str(), "pending");
    }

    #[test]
    fn legacy_post_without_optional_fields_parses() {
        let json = r#"{
            "id": "welcome",
            "author": "admin",
            "title": "Hi",
            "content": "Body",
            "date": "2024-01-02",
            "tags": ["welcome"],
            "status": "published",
            "views": 3,
            "likes": 0
        }"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.views, 3);
        assert!(post.comments.is_empty());
        assert!(post.created.is_none());
    }

    #[test]
    fn soft_delete_keeps_record() {
        let mut post = Post::new(
            "p1".into(),
            "demo",
            "T",
            "C",
            vec![],
            PostStatus::Published,
        );
        post.soft_delete("admin");
        assert!(post.is_deleted());
        assert_eq!(post.deleted_by.as_deref(), Some("admin"));
        assert!(post.deleted_at.is_some());
        assert_eq!(post.title, "T");
    }
}
