//! Content records produced by the loader

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use super::FrontMatter;

/// Which branch of the content tree a file came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Project,
    Blog,
}

impl ContentKind {
    /// Directory below the content root holding this kind
    pub fn dir_name(&self) -> &'static str {
        match self {
            ContentKind::Project => "projects",
            ContentKind::Blog => "blog",
        }
    }

    /// Human label shown on cards
    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Project => "Project",
            ContentKind::Blog => "Blog",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// A single markdown file after loading and rendering
#[derive(Debug, Clone)]
pub struct ContentRecord {
    /// File stem, unique within its kind
    pub slug: String,
    pub kind: ContentKind,
    pub front_matter: FrontMatter,
    /// Resolved project group key; `None` for blog posts
    pub group_key: Option<String>,
    /// Markdown body as written
    pub raw_body: String,
    /// Rendered HTML body
    pub html: String,
    /// Source path relative to the content root
    pub source: PathBuf,
}

impl ContentRecord {
    pub fn title(&self) -> &str {
        &self.front_matter.title
    }

    pub fn date(&self) -> NaiveDateTime {
        self.front_matter.date
    }

    pub fn tags(&self) -> &[String] {
        &self.front_matter.tags
    }

    pub fn is_index(&self) -> bool {
        self.front_matter.is_index
    }

    /// Case-insensitive tag membership
    pub fn has_tag(&self, tag: &str) -> bool {
        let key = tag_key(tag);
        self.tags().iter().any(|t| tag_key(t) == key)
    }

    /// Directory of the source file, relative to the content root
    pub fn source_dir(&self) -> &Path {
        self.source.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// Normalised form used to compare tags
pub fn tag_key(tag: &str) -> String {
    tag.trim().to_lowercase()
}
