//! Aggregated site snapshot and its queries
//!
//! A [`Site`] is built once from the loaded records and never changes; the
//! page renderer, the generator and the dev server only read it.

pub mod aggregate;
mod homepage;
mod tags;

pub use aggregate::{aggregate, Aggregate, Project};
pub use homepage::{select_homepage, HOMEPAGE_MAX_ITEMS, HOMEPAGE_PREFERRED_EACH};
pub use tags::{TagCount, TagEntry, TagIndex, TagPost};

use crate::content::{tag_key, ContentKind, ContentRecord};

/// Immutable, queryable view of all content
#[derive(Debug, Clone, Default)]
pub struct Site {
    projects: Vec<Project>,
    blog_posts: Vec<ContentRecord>,
    tags: TagIndex,
    about_html: Option<String>,
}

impl Site {
    /// Aggregate `records` and index their tags
    pub fn new(records: Vec<ContentRecord>) -> Self {
        let Aggregate {
            projects,
            blog_posts,
        } = aggregate(records);

        let mut site = Self {
            projects,
            blog_posts,
            tags: TagIndex::default(),
            about_html: None,
        };
        site.tags = site.build_tag_index();
        site
    }

    /// Attach the rendered `about.md` body
    pub fn with_about(mut self, html: Option<String>) -> Self {
        self.about_html = html;
        self
    }

    fn build_tag_index(&self) -> TagIndex {
        let mut index = TagIndex::default();
        for post in self.tag_pool() {
            index.insert(
                post.tags(),
                TagPost {
                    kind: post.kind,
                    project: post.group_key.clone(),
                    slug: post.slug.clone(),
                },
            );
        }
        index
    }

    /// Every post that can carry tags: each project's index post and
    /// updates, then the blog
    fn tag_pool(&self) -> impl Iterator<Item = &ContentRecord> {
        self.projects
            .iter()
            .flat_map(|p| p.posts())
            .chain(self.blog_posts.iter())
    }

    /// Projects, newest first
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Blog posts, newest first
    pub fn blog_posts(&self) -> &[ContentRecord] {
        &self.blog_posts
    }

    pub fn project_by_slug(&self, slug: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.slug == slug)
    }

    pub fn blog_post_by_slug(&self, slug: &str) -> Option<&ContentRecord> {
        self.blog_posts.iter().find(|p| p.slug == slug)
    }

    pub fn recent_projects(&self, n: usize) -> &[Project] {
        &self.projects[..n.min(self.projects.len())]
    }

    pub fn recent_blog_posts(&self, n: usize) -> &[ContentRecord] {
        &self.blog_posts[..n.min(self.blog_posts.len())]
    }

    /// Projects whose index post is marked `featured`
    pub fn featured_projects(&self) -> Vec<&Project> {
        self.projects
            .iter()
            .filter(|p| p.index_post.front_matter.featured)
            .collect()
    }

    /// Every project update across all projects, newest first
    pub fn all_updates(&self) -> Vec<&ContentRecord> {
        let mut updates: Vec<&ContentRecord> =
            self.projects.iter().flat_map(|p| p.updates.iter()).collect();
        updates.sort_by(|a, b| b.date().cmp(&a.date()));
        updates
    }

    /// Posts carrying `tag` (any casing), newest first
    pub fn posts_by_tag(&self, tag: &str) -> Vec<&ContentRecord> {
        let mut posts: Vec<&ContentRecord> =
            self.tag_pool().filter(|post| post.has_tag(tag)).collect();
        posts.sort_by(|a, b| b.date().cmp(&a.date()));
        posts
    }

    /// Tags with usage counts, most used first
    pub fn all_tags(&self) -> Vec<TagCount> {
        self.tags.counts()
    }

    pub fn tag_index(&self) -> &TagIndex {
        &self.tags
    }

    /// First-seen spelling of `tag`, if any post uses it
    pub fn tag_display_name(&self, tag: &str) -> Option<&str> {
        self.tags.get(tag).map(|entry| entry.name.as_str())
    }

    /// Number of project records (index posts plus updates)
    pub fn project_post_count(&self) -> usize {
        self.projects.iter().map(|p| 1 + p.updates.len()).sum()
    }

    /// Project a record belongs to
    pub fn project_of(&self, record: &ContentRecord) -> Option<&Project> {
        match record.kind {
            ContentKind::Project => record
                .group_key
                .as_deref()
                .and_then(|key| self.project_by_slug(key)),
            ContentKind::Blog => None,
        }
    }

    pub fn about_html(&self) -> Option<&str> {
        self.about_html.as_deref()
    }

    /// Lower-cased key of every tag, for building tag pages
    pub fn tag_keys(&self) -> Vec<String> {
        self.tags.iter().map(|entry| tag_key(&entry.name)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    fn site() -> Site {
        Site::new(sample_records())
    }

    #[test]
    fn test_lookups() {
        let site = site();
        assert_eq!(site.projects().len(), 2);
        assert_eq!(site.blog_posts().len(), 3);
        assert!(site.project_by_slug("weather-station").is_some());
        assert!(site.project_by_slug("nope").is_none());
        assert_eq!(site.blog_post_by_slug("welcome").unwrap().title(), "Post welcome");
        assert!(site.blog_post_by_slug("index").is_none());
        assert_eq!(site.project_post_count(), 4);
    }

    #[test]
    fn test_recent_is_a_prefix() {
        let site = site();
        assert_eq!(site.recent_projects(1)[0].slug, "weather-station");
        assert_eq!(site.recent_projects(10).len(), 2);
        let recent: Vec<_> = site.recent_blog_posts(2).iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(recent, vec!["async-notes", "welcome"]);
    }

    #[test]
    fn test_posts_by_tag_ignores_case() {
        let site = site();
        let expected: Vec<&str> = site
            .posts_by_tag("Web Development")
            .iter()
            .map(|p| p.slug.as_str())
            .collect();
        assert_eq!(expected, vec!["dashboard", "async-notes"]);
        for spelling in ["web development", "WEB DEVELOPMENT"] {
            let slugs: Vec<&str> = site
                .posts_by_tag(spelling)
                .iter()
                .map(|p| p.slug.as_str())
                .collect();
            assert_eq!(slugs, expected);
        }
        assert!(site.posts_by_tag("missing").is_empty());
    }

    #[test]
    fn test_tag_counts_match_pool() {
        let site = site();
        let tags = site.all_tags();
        for tag in &tags {
            assert_eq!(tag.count, site.posts_by_tag(&tag.name).len(), "{}", tag.name);
        }
        let names: Vec<(&str, usize)> = tags.iter().map(|t| (t.name.as_str(), t.count)).collect();
        assert_eq!(
            names,
            vec![
                ("Rust", 3),
                ("IoT", 2),
                ("Web Development", 2),
                ("Intro", 1),
                ("PLC", 1),
            ]
        );
        assert_eq!(site.tag_display_name("iot"), Some("IoT"));
        assert_eq!(site.tag_display_name("unknown"), None);
    }

    #[test]
    fn test_updates_and_featured() {
        let mut records = sample_records();
        records[3].front_matter.featured = true;
        let site = Site::new(records);

        let updates: Vec<_> = site.all_updates().iter().map(|u| u.slug.as_str()).collect();
        assert_eq!(updates, vec!["dashboard", "sensors"]);

        let featured: Vec<_> = site.featured_projects().iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(featured, vec!["plc-bridge"]);

        let sensors = site.project_by_slug("weather-station").unwrap().updates[1].clone();
        assert_eq!(site.project_of(&sensors).unwrap().slug, "weather-station");
    }
}
