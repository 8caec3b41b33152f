//! Data structures for template context
//!
//! Text fields are HTML-escaped when the view is built; the templates print
//! them as-is.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct LayoutData {
    /// Contents of `<title>`
    pub title: String,
    pub site_name: String,
    pub site_subtitle: String,
    pub footer: String,
    pub show_generator_credit: bool,
    pub year: i32,
    pub nav: NavData,
    pub assets: AssetUrls,
    /// Load the Gantt and timeline widgets
    pub project_widgets: bool,
    pub meta_generator: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavData {
    pub home_href: String,
    pub links: Vec<NavLink>,
    pub floating: bool,
    pub sticky: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavLink {
    pub label: String,
    pub href: String,
    pub icon: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetUrls {
    pub main_css: String,
    pub components_css: String,
    pub components_js: String,
    pub gallery_js: String,
    pub gantt_js: String,
    pub timeline_js: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagLink {
    pub name: String,
    pub href: String,
}

/// A project or post in a listing
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    /// "Project" or "Blog"
    pub kind: &'static str,
    pub title: String,
    pub href: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub description: String,
    /// Rendered body, for an excerpt when there is no description
    pub body_html: String,
    pub tags: Vec<TagLink>,
    pub featured: bool,
    pub update_count: usize,
    pub latest_update: Option<String>,
    pub has_gantt: bool,
    pub has_timeline: bool,
}

/// One update shown on its project's page
#[derive(Debug, Clone, Serialize)]
pub struct UpdateView {
    pub anchor: String,
    pub title: String,
    pub date: String,
    pub tags: Vec<TagLink>,
    pub html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineItem {
    pub title: String,
    pub date: String,
    pub href: String,
}

/// Full project page
#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    pub title: String,
    pub date: String,
    pub description: String,
    pub tags: Vec<TagLink>,
    pub html: String,
    pub has_gantt: bool,
    /// Attribute-escaped JSON for `data-gantt`
    pub gantt_json: String,
    pub latest_update: Option<LatestUpdate>,
    pub updates: Vec<UpdateView>,
    pub timeline: Vec<TimelineItem>,
}

/// Jump link to the newest update
#[derive(Debug, Clone, Serialize)]
pub struct LatestUpdate {
    pub anchor: String,
    pub date: String,
}

/// Single blog article
#[derive(Debug, Clone, Serialize)]
pub struct ArticleView {
    pub title: String,
    pub date: String,
    pub description: String,
    pub tags: Vec<TagLink>,
    pub html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagCard {
    pub name: String,
    pub href: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactLink {
    pub label: String,
    pub href: String,
    pub external: bool,
}

/// Links used by listing and error pages
#[derive(Debug, Clone, Serialize)]
pub struct PageLinks {
    pub home: String,
    pub projects: String,
    pub blog: String,
    pub tags: String,
}
