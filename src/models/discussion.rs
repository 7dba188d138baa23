use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Comment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscussionStatus {
    #[default]
    Open,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discussion {
    pub id: String,
    /// Weak reference to the owning project.
    pub project_id: String,
    pub author: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: DiscussionStatus,
    #[serde(default)]
    pub upvotes: u64,
    #[serde(default)]
    pub downvotes: u64,
    /// One entry per user id; a repeat vote replaces the previous one.
    #[serde(default)]
    pub votes: BTreeMap<String, Vote>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Discussion {
    pub fn new(id: String, project_id: &str, author: &str, title: &str, content: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            project_id: project_id.to_string(),
            author: author.to_string(),
            title: title.trim().to_string(),
            content: content.trim().to_string(),
            tags: Vec::new(),
            status: DiscussionStatus::Open,
            upvotes: 0,
            downvotes: 0,
            votes: BTreeMap::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.status == DiscussionStatus::Deleted
    }

    pub fn score(&self) -> i64 {
        self.upvotes as i64 - self.downvotes as i64
    }

    /// Records `vote` for `user_id`, undoing that user's previous vote first.
    /// Returns the vote that was replaced, if any.
    pub fn cast_vote(&mut self, user_id: &str, vote: Vote) -> Option<Vote> {
        let previous = self.votes.insert(user_id.to_string(), vote);

        match previous {
            Some(Vote::Up) => self.upvotes = self.upvotes.saturating_sub(1),
            Some(Vote::Down) => self.downvotes = self.downvotes.saturating_sub(1),
            None => {}
        }
        match vote {
            Vote::Up => self.upvotes += 1,
            Vote::Down => self.downvotes += 1,
        }

        self.updated_at = Utc::now();
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discussion() -> Discussion {
        Discussion::new("d1".into(), "p1", "ada", "Question", "Body")
    }

    #[test]
    fn first_vote_counts_once() {
        let mut d = discussion();
        assert_eq!(d.cast_vote("u1", Vote::Up), None);
        assert_eq!((d.upvotes, d.downvotes), (1, 0));
        assert_eq!(d.score(), 1);
    }

    #[test]
    fn repeat_vote_is_not_accumulated() {
        let mut d = discussion();
        d.cast_vote("u1", Vote::Up);
        assert_eq!(d.cast_vote("u1", Vote::Up), Some(Vote::Up));
        assert_eq!((d.upvotes, d.downvotes), (1, 0));
        assert_eq!(d.votes.len(), 1);
    }

    #[test]
    fn changing_vote_moves_the_count() {
        let mut d = discussion();
        d.cast_vote("u1", Vote::Up);
        d.cast_vote("u2", Vote::Up);
        d.cast_vote("u1", Vote::Down);
        assert_eq!((d.upvotes, d.downvotes), (1, 1));
        assert_eq!(d.votes.get("u1"), Some(&Vote::Down));
        assert_eq!(d.score(), 0);
    }

    #[test]
    fn counters_match_vote_map() {
        let mut d = discussion();
        let sequence = [
            ("a", Vote::Up),
            ("b", Vote::Down),
            ("a", Vote::Down),
            ("c", Vote::Up),
            ("b", Vote::Up),
            ("a", Vote::Up),
        ];
        for (user, vote) in sequence {
            d.cast_vote(user, vote);
        }
        let ups = d.votes.values().filter(|v| **v == Vote::Up).count() as u64;
        let downs = d.votes.values().filter(|v| **v == Vote::Down).count() as u64;
        assert_eq!(d.upvotes, ups);
        assert_eq!(d.downvotes, downs);
        assert_eq!(d.upvotes + d.downvotes, d.votes.len() as u64);
    }

    #[test]
    fn status_defaults_to_open_when_missing() {
        let json = r#"{
            "id": "d1", "projectId": "p1", "author": "ada",
            "title": "Q", "content": "B",
            "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"
        }"#;
        let d: Discussion = serde_json::from_str(json).unwrap();
        assert_eq!(d.status, DiscussionStatus::Open);
        assert!(!d.is_deleted());
        assert!(d.votes.is_empty());
    }
}
