use serde::{Deserialize, Serialize};

use super::document::Document;
use crate::models::{
    Discussion, Member, Milestone, Post, PostStatus, Priority, Project, ProjectStatus,
};

/// Which demo content a fresh store starts with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Blog,
    Research,
}

pub fn document(preset: Preset) -> Document {
    match preset {
        Preset::Blog => blog(),
        Preset::Research => research(),
    }
}

fn blog() -> Document {
    let mut doc = Document::empty();

    let welcome = Post::new(
        "welcome".into(),
        "admin",
        "Welcome to the board",
        "# Hello!\n\nEveryone can write here. Each post gets its own id, \
         so nobody overwrites anybody else.\n\n\
         - Markdown is supported\n- Filter by author, tag or status\n- Search titles and content",
        vec!["welcome".into(), "platform".into(), "demo".into()],
        PostStatus::Published,
    );
    let example = Post::new(
        "example".into(),
        "demo",
        "Example user post",
        "# An example\n\nPosts like this one can be edited by their author \
         or by `admin`.\n\n**Bold**, *italic* and `code` all render.",
        vec!["example".into(), "demo".into(), "tutorial".into()],
        PostStatus::Published,
    );

    for post in [welcome, example] {
        doc.posts.insert(post.id.clone(), post);
    }
    doc
}

fn research() -> Document {
    let mut doc = Document::empty();

    let lead_name = "Ada Lovelace";
    let mut lead = Member::new(crate::ids::member_id(lead_name), lead_name);
    lead.apply_profile(Some("lead"), Some("Analytical Society"));

    let mut project = Project::new(
        "welcome-project".into(),
        lead_name,
        "Getting started with the research board",
        "A sample project. Add team members, track milestones and open \
         discussions that the team can vote on.",
    );
    project.status = ProjectStatus::Active;
    project.priority = Priority::High;
    project.phase = "research".into();
    project.tags = vec!["welcome".into(), "demo".into()];
    project.add_institution(&lead.institution);
    project.add_to_team(&lead.id);
    project
        .milestones
        .push(Milestone::new("Invite the first collaborators", None));

    let mut discussion = Discussion::new(
        "welcome-discussion".into(),
        &project.id,
        lead_name,
        "What should we study first?",
        "Vote on this thread or reply with a comment.",
    );
    discussion.tags = vec!["planning".into()];

    lead.link_project(&project.id);
    doc.members.insert(lead.id.clone(), lead);
    doc.discussions.insert(discussion.id.clone(), discussion);
    doc.projects.insert(project.id.clone(), project);
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blog_seed_has_two_published_posts() {
        let doc = document(Preset::Blog);
        assert_eq!(doc.posts.len(), 2);
        assert!(doc
            .posts
            .values()
            .all(|p| p.status == PostStatus::Published && p.views == 0 && p.likes == 0));
        assert_eq!(doc.posts["welcome"].author, "admin");
        assert_eq!(doc.posts["example"].author, "demo");
        assert!(doc.projects.is_empty());
    }

    #[test]
    fn research_seed_links_lead_both_ways() {
        let doc = document(Preset::Research);
        let project = &doc.projects["welcome-project"];
        let lead = &doc.members["ada-lovelace"];
        assert_eq!(project.team, vec!["ada-lovelace"]);
        assert_eq!(lead.projects, vec!["welcome-project"]);
        assert_eq!(
            doc.discussions["welcome-discussion"].project_id,
            "welcome-project"
        );
    }

    #[test]
    fn seeds_are_deterministic_apart_from_timestamps() {
        let a = document(Preset::Research);
        let b = document(Preset::Research);
        let keys = |d: &Document| d.projects.keys().cloned().collect::<Vec<_>>();
        assert_eq!(keys(&a), keys(&b));
        assert_eq!(
            a.posts.keys().collect::<Vec<_>>(),
            b.posts.keys().collect::<Vec<_>>()
        );
    }
}
