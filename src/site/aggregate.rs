//! Grouping of loaded records into projects and the blog

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

use crate::content::{ContentKind, ContentRecord};

/// A project: one landing post plus dated updates
#[derive(Debug, Clone)]
pub struct Project {
    /// Group key shared by every member
    pub slug: String,
    pub index_post: ContentRecord,
    /// Newest first
    pub updates: Vec<ContentRecord>,
    /// No member was marked `isIndex`; the earliest record was promoted
    pub index_fallback: bool,
}

impl Project {
    pub fn latest_update(&self) -> Option<&ContentRecord> {
        self.updates.first()
    }

    pub fn date(&self) -> NaiveDateTime {
        self.index_post.date()
    }

    pub fn title(&self) -> &str {
        self.index_post.title()
    }

    /// Index post followed by the updates
    pub fn posts(&self) -> impl Iterator<Item = &ContentRecord> {
        std::iter::once(&self.index_post).chain(self.updates.iter())
    }

    /// Date of the most recent member
    pub fn last_modified(&self) -> NaiveDateTime {
        self.posts()
            .map(|p| p.date())
            .max()
            .unwrap_or_else(|| self.date())
    }

    /// Source directories of the members, relative to the content root
    pub fn source_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = Vec::new();
        for dir in self.posts().map(|p| p.source_dir()) {
            if !dirs.iter().any(|d| d == dir) {
                dirs.push(dir.to_path_buf());
            }
        }
        dirs
    }

    pub fn has_gantt(&self) -> bool {
        self.index_post.front_matter.gantt.is_some()
    }

    pub fn has_timeline(&self) -> bool {
        !self.index_post.front_matter.timeline.is_empty()
    }
}

/// Result of aggregation
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    /// Newest index post first, ties by slug
    pub projects: Vec<Project>,
    /// Newest first
    pub blog_posts: Vec<ContentRecord>,
}

/// Group records into projects and a flat blog list
pub fn aggregate(records: Vec<ContentRecord>) -> Aggregate {
    let mut groups: IndexMap<String, Vec<ContentRecord>> = IndexMap::new();
    let mut blog_posts = Vec::new();

    for record in records {
        match record.kind {
            ContentKind::Blog => blog_posts.push(record),
            ContentKind::Project => {
                let key = record
                    .group_key
                    .clone()
                    .unwrap_or_else(|| record.slug.clone());
                groups.entry(key).or_default().push(record);
            }
        }
    }

    let mut projects: Vec<Project> = groups
        .into_iter()
        .filter_map(|(slug, members)| build_project(slug, members))
        .collect();
    projects.sort_by(|a, b| b.date().cmp(&a.date()).then_with(|| a.slug.cmp(&b.slug)));

    // sort_by is stable, so equal dates keep encounter order
    blog_posts.sort_by(|a, b| b.date().cmp(&a.date()));

    Aggregate {
        projects,
        blog_posts,
    }
}

fn build_project(slug: String, members: Vec<ContentRecord>) -> Option<Project> {
    let (candidates, mut updates): (Vec<_>, Vec<_>) =
        members.into_iter().partition(|r| r.is_index());

    let (index_post, index_fallback) = if candidates.is_empty() {
        let index_post = take_earliest(&mut updates)?;
        tracing::warn!(
            "Project `{}` has no post marked isIndex; using `{}` ({:?}) as its index",
            slug,
            index_post.slug,
            index_post.source
        );
        (index_post, true)
    } else {
        let mut candidates = candidates;
        let index_post = take_earliest(&mut candidates)?;
        for extra in &candidates {
            tracing::warn!(
                "Project `{}` has several index posts; treating `{}` as an update",
                slug,
                extra.slug
            );
        }
        updates.extend(candidates);
        (index_post, false)
    };

    updates.sort_by(|a, b| b.date().cmp(&a.date()));

    Some(Project {
        slug,
        index_post,
        updates,
        index_fallback,
    })
}

/// Remove and return the earliest record; ties go to the smaller slug,
/// then to the first encountered
fn take_earliest(records: &mut Vec<ContentRecord>) -> Option<ContentRecord> {
    let position = records
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.date().cmp(&b.date()).then_with(|| a.slug.cmp(&b.slug)))
        .map(|(i, _)| i)?;
    Some(records.remove(position))
}

/// Content-relative directories holding project media, keyed by project slug
pub fn media_dirs<'a>(projects: &'a [Project], content_root: &'a Path) -> Vec<(&'a str, PathBuf)> {
    let mut dirs = Vec::new();
    for project in projects {
        for dir in project.source_dirs() {
            let img = content_root.join(dir).join("img");
            if img.is_dir() {
                dirs.push((project.slug.as_str(), img));
            }
        }
    }
    dirs
}
