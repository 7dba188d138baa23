pub mod discussion;
pub mod member;
pub mod post;
pub mod project;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use discussion::{Discussion, DiscussionStatus, Vote};
pub use member::Member;
pub use post::{Post, PostStatus};
pub use project::{Milestone, MilestoneStatus, Priority, Project, ProjectStatus};

/// A comment owned by its parent post or discussion. Kept in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub content: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub likes: u64,
}

impl Comment {
    pub fn new(author: &str, content: &str) -> Self {
        Self {
            id: crate::ids::prefixed_id("comment"),
            author: author.to_string(),
            content: content.trim().to_string(),
            date: Utc::now(),
            likes: 0,
        }
    }
}

/// Tags arrive either as a JSON array or as a comma separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Csv(String),
}

impl TagsInput {
    /// Trimmed, non-empty, first occurrence wins.
    pub fn normalize(self) -> Vec<String> {
        let raw: Vec<String> = match self {
            TagsInput::List(list) => list,
            TagsInput::Csv(csv) => csv.split(',').map(str::to_string).collect(),
        };
        let mut tags: Vec<String> = Vec::with_capacity(raw.len());
        for tag in raw {
            let tag = tag.trim();
            if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_tags_are_split_and_trimmed() {
        let tags = TagsInput::Csv(" rust, web ,,rust".into()).normalize();
        assert_eq!(tags, vec!["rust", "web"]);
    }

    #[test]
    fn list_tags_drop_blanks() {
        let tags = TagsInput::List(vec!["a".into(), " ".into(), "b".into()]).normalize();
        assert_eq!(tags, vec!["a", "b"]);
    }

    #[test]
    fn tags_deserialize_from_either_shape() {
        let list: TagsInput = serde_json::from_str(r#"["x","y"]"#).unwrap();
        let csv: TagsInput = serde_json::from_str(r#""x,y""#).unwrap();
        assert_eq!(list.normalize(), csv.normalize());
    }

    #[test]
    fn new_comment_trims_content() {
        let comment = Comment::new("demo", "  hi  ");
        assert_eq!(comment.content, "hi");
        assert!(comment.id.starts_with("comment-"));
        assert_eq!(comment.likes, 0);
    }
}
