//! Filtering, ordering and aggregation over collections loaded from the store.
//!
//! Everything here is pure: callers pass in what they read from the document
//! and get owned results back.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Discussion, Post, PostStatus, Project};
use crate::store::Document;

/// Query-string values that are absent or blank do not filter.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn has_tag(tags: &[String], tag: &str) -> bool {
    tags.iter().any(|t| t == tag)
}

// --- Filters ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostFilter {
    pub author: Option<String>,
    pub tag: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        if let Some(author) = present(&self.author) {
            if post.author != author {
                return false;
            }
        }
        if let Some(tag) = present(&self.tag) {
            if !has_tag(&post.tags, tag) {
                return false;
            }
        }
        if let Some(status) = present(&self.status) {
            if post.status.as_str() != status {
                return false;
            }
        }
        if let Some(search) = present(&self.search) {
            let q = search.to_lowercase();
            if !contains_ci(&post.title, &q) && !contains_ci(&post.content, &q) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {
    pub lead: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub institution: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

impl ProjectFilter {
    pub fn matches(&self, project: &Project) -> bool {
        if let Some(lead) = present(&self.lead) {
            if project.lead != lead {
                return false;
            }
        }
        if let Some(status) = present(&self.status) {
            if project.status.as_str() != status {
                return false;
            }
        }
        if let Some(priority) = present(&self.priority) {
            if project.priority.as_str() != priority {
                return false;
            }
        }
        if let Some(institution) = present(&self.institution) {
            if !project.institutions.iter().any(|i| i == institution) {
                return false;
            }
        }
        if let Some(tag) = present(&self.tag) {
            if !has_tag(&project.tags, tag) {
                return false;
            }
        }
        if let Some(search) = present(&self.search) {
            let q = search.to_lowercase();
            if !contains_ci(&project.title, &q) && !contains_ci(&project.description, &q) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionFilter {
    pub project_id: Option<String>,
    pub author: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

impl DiscussionFilter {
    pub fn matches(&self, discussion: &Discussion) -> bool {
        if let Some(project_id) = present(&self.project_id) {
            if discussion.project_id != project_id {
                return false;
            }
        }
        if let Some(author) = present(&self.author) {
            if discussion.author != author {
                return false;
            }
        }
        if let Some(tag) = present(&self.tag) {
            if !has_tag(&discussion.tags, tag) {
                return false;
            }
        }
        if let Some(search) = present(&self.search) {
            let q = search.to_lowercase();
            if !contains_ci(&discussion.title, &q) && !contains_ci(&discussion.content, &q) {
                return false;
            }
        }
        true
    }
}

// --- Ordering ---

fn newest_post_first(a: &Post, b: &Post) -> Ordering {
    b.date.cmp(&a.date).then_with(|| b.created.cmp(&a.created))
}

pub fn sort_posts_newest_first(posts: &mut [Post]) {
    posts.sort_by(newest_post_first);
}

/// High before medium before low; within a rank, most recently updated first.
pub fn sort_projects_by_priority(projects: &mut [Project]) {
    projects.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| b.updated_at.cmp(&a.updated_at))
    });
}

/// Highest net score first; ties go to the newer discussion.
pub fn sort_discussions_by_score(discussions: &mut [Discussion]) {
    discussions.sort_by(|a, b| {
        b.score()
            .cmp(&a.score())
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

pub fn list_posts<'a>(posts: impl IntoIterator<Item = &'a Post>, filter: &PostFilter) -> Vec<Post> {
    let mut out: Vec<Post> = posts
        .into_iter()
        .filter(|p| filter.matches(p))
        .cloned()
        .collect();
    sort_posts_newest_first(&mut out);
    out
}

pub fn list_projects<'a>(
    projects: impl IntoIterator<Item = &'a Project>,
    filter: &ProjectFilter,
) -> Vec<Project> {
    let mut out: Vec<Project> = projects
        .into_iter()
        .filter(|p| filter.matches(p))
        .cloned()
        .collect();
    sort_projects_by_priority(&mut out);
    out
}

pub fn list_discussions<'a>(
    discussions: impl IntoIterator<Item = &'a Discussion>,
    filter: &DiscussionFilter,
) -> Vec<Discussion> {
    let mut out: Vec<Discussion> = discussions
        .into_iter()
        .filter(|d| filter.matches(d))
        .cloned()
        .collect();
    sort_discussions_by_score(&mut out);
    out
}

// --- Aggregation ---

const TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogStats {
    pub total_posts: usize,
    pub published_posts: usize,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_comments: usize,
    /// `[author, post count]` pairs, most prolific first.
    pub top_authors: Vec<(String, usize)>,
    pub recent_posts: Vec<PostSummary>,
    /// Milliseconds since the store document was created.
    pub platform_uptime: i64,
}

pub fn blog_stats(doc: &Document, now: DateTime<Utc>) -> BlogStats {
    let posts: Vec<&Post> = doc.posts.values().collect();

    let mut per_author: HashMap<&str, usize> = HashMap::new();
    for post in &posts {
        *per_author.entry(post.author.as_str()).or_default() += 1;
    }
    let mut top_authors: Vec<(String, usize)> = per_author
        .into_iter()
        .map(|(author, n)| (author.to_string(), n))
        .collect();
    top_authors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_authors.truncate(TOP_N);

    let mut published: Vec<Post> = posts
        .iter()
        .filter(|p| p.status == PostStatus::Published)
        .map(|p| (*p).clone())
        .collect();
    sort_posts_newest_first(&mut published);

    BlogStats {
        total_posts: posts.len(),
        published_posts: published.len(),
        total_views: posts.iter().map(|p| p.views).sum(),
        total_likes: posts.iter().map(|p| p.likes).sum(),
        total_comments: posts.iter().map(|p| p.comments.len()).sum(),
        top_authors,
        recent_posts: published
            .into_iter()
            .take(TOP_N)
            .map(|p| PostSummary {
                id: p.id,
                title: p.title,
                author: p.author,
            })
            .collect(),
        platform_uptime: (now - doc.meta.created_at).num_milliseconds(),
    }
}

/// `round(100 * up / max(up + down, 1))`
pub fn consensus_rate(upvotes: u64, downvotes: u64) -> u64 {
    let total = (upvotes + downvotes).max(1);
    (100.0 * upvotes as f64 / total as f64).round() as u64
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBreakdown {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
    pub by_phase: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionTotals {
    pub total: usize,
    pub comments: usize,
    pub upvotes: u64,
    pub downvotes: u64,
    pub votes: u64,
    pub consensus_rate: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionSummary {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub upvotes: u64,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchAnalytics {
    pub projects: ProjectBreakdown,
    pub discussions: DiscussionTotals,
    pub top_discussions: Vec<DiscussionSummary>,
    pub milestones: BTreeMap<String, usize>,
    pub members: usize,
    pub institutions: usize,
}

pub fn research_analytics(doc: &Document) -> ResearchAnalytics {
    let mut by_status = BTreeMap::new();
    let mut by_priority = BTreeMap::new();
    let mut by_phase = BTreeMap::new();
    let mut milestones = BTreeMap::new();
    let mut institutions: BTreeSet<&str> = BTreeSet::new();

    for project in doc.projects.values() {
        *by_status.entry(project.status.as_str().to_string()).or_insert(0) += 1;
        *by_priority.entry(project.priority.as_str().to_string()).or_insert(0) += 1;
        *by_phase.entry(project.phase.clone()).or_insert(0) += 1;
        for m in &project.milestones {
            *milestones.entry(m.status.as_str().to_string()).or_insert(0) += 1;
        }
        institutions.extend(project.institutions.iter().map(String::as_str));
    }
    institutions.extend(
        doc.members
            .values()
            .map(|m| m.institution.as_str())
            .filter(|i| !i.is_empty()),
    );

    let upvotes: u64 = doc.discussions.values().map(|d| d.upvotes).sum();
    let downvotes: u64 = doc.discussions.values().map(|d| d.downvotes).sum();

    let mut ranked: Vec<&Discussion> = doc.discussions.values().collect();
    ranked.sort_by(|a, b| {
        b.upvotes
            .cmp(&a.upvotes)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });

    ResearchAnalytics {
        projects: ProjectBreakdown {
            total: doc.projects.len(),
            by_status,
            by_priority,
            by_phase,
        },
        discussions: DiscussionTotals {
            total: doc.discussions.len(),
            comments: doc.discussions.values().map(|d| d.comments.len()).sum(),
            upvotes,
            downvotes,
            votes: upvotes + downvotes,
            consensus_rate: consensus_rate(upvotes, downvotes),
        },
        top_discussions: ranked
            .into_iter()
            .take(TOP_N)
            .map(|d| DiscussionSummary {
                id: d.id.clone(),
                project_id: d.project_id.clone(),
                title: d.title.clone(),
                upvotes: d.upvotes,
                score: d.score(),
            })
            .collect(),
        milestones,
        members: doc.members.len(),
        institutions: institutions.len(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    pub posts: Vec<Post>,
    pub projects: Vec<Project>,
    pub discussions: Vec<Discussion>,
}

impl SearchResults {
    pub fn count(&self) -> usize {
        self.posts.len() + self.projects.len() + self.discussions.len()
    }
}

/// Free-text search across every aggregate kind. Soft-deleted records are skipped.
pub fn search_all(doc: &Document, query: &str) -> SearchResults {
    let search = Some(query.to_string());

    let posts = list_posts(
        doc.posts.values().filter(|p| !p.is_deleted()),
        &PostFilter {
            search: search.clone(),
            ..Default::default()
        },
    );
    let projects = list_projects(
        doc.projects.values().filter(|p| !p.is_deleted()),
        &ProjectFilter {
            search: search.clone(),
            ..Default::default()
        },
    );
    let discussions = list_discussions(
        doc.discussions.values().filter(|d| !d.is_deleted()),
        &DiscussionFilter {
            search,
            ..Default::default()
        },
    );

    SearchResults {
        posts,
        projects,
        discussions,
    }
}
