//! Content loader - reads project and blog markdown from the content directory

use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::gallery::{expand_directives, media_base};
use super::{ContentError, ContentKind, ContentRecord, FrontMatter, FrontMatterError};
use super::MarkdownRenderer;
use crate::config::SiteConfig;

/// Files with this prefix are sample content, left out of release builds
const DEMO_PREFIX: &str = "demo-";

/// Optional about page body below the content root
pub const ABOUT_FILE: &str = "about.md";

/// Which files make it into a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    #[default]
    Dev,
    Release,
}

/// Loads content from the content directory
pub struct ContentLoader {
    renderer: MarkdownRenderer,
    mode: BuildMode,
}

impl ContentLoader {
    /// Create a new content loader
    pub fn new(config: &SiteConfig, mode: BuildMode) -> Self {
        Self {
            renderer: MarkdownRenderer::from_config(&config.highlight),
            mode,
        }
    }

    /// Load every project and blog record below `content_root`.
    ///
    /// Projects come first, then blog posts, each in file-name order.
    pub fn load_all(&self, content_root: &Path) -> Result<Vec<ContentRecord>, ContentError> {
        let mut records = self.load_kind(content_root, ContentKind::Project)?;
        let blog = self.load_kind(content_root, ContentKind::Blog)?;
        check_unique_slugs(&records, |r| {
            format!("{}/{}", r.group_key.as_deref().unwrap_or_default(), r.slug)
        })?;
        check_unique_slugs(&blog, |r| r.slug.clone())?;

        tracing::debug!(
            "Loaded {} project records and {} blog posts",
            records.len(),
            blog.len()
        );
        records.extend(blog);
        Ok(records)
    }

    fn load_kind(
        &self,
        content_root: &Path,
        kind: ContentKind,
    ) -> Result<Vec<ContentRecord>, ContentError> {
        let dir = content_root.join(kind.dir_name());
        if !dir.is_dir() {
            tracing::info!("No {} directory found at {:?}", kind, dir);
            return Ok(Vec::new());
        }

        let files = self.collect_files(&dir);
        // collect() on an indexed parallel iterator keeps input order
        files
            .par_iter()
            .map(|path| self.load_file(content_root, &dir, path, kind))
            .collect()
    }

    /// Markdown files below `dir`, sorted by path
    fn collect_files(&self, dir: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {:?}: {}", dir, e);
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !is_markdown_file(path) {
                continue;
            }
            if self.mode == BuildMode::Release && is_demo_file(path) {
                tracing::info!("Skipping demo file {:?}", path);
                continue;
            }
            files.push(path.to_path_buf());
        }

        files
    }

    /// Load a single record
    fn load_file(
        &self,
        content_root: &Path,
        kind_dir: &Path,
        path: &Path,
        kind: ContentKind,
    ) -> Result<ContentRecord, ContentError> {
        let content = fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let (front_matter, body) =
            FrontMatter::parse(&content).map_err(|source| ContentError::FrontMatter {
                path: path.to_path_buf(),
                source,
            })?;

        let slug = file_slug(path);
        let group_key = match kind {
            ContentKind::Project => Some(resolve_group_key(&front_matter, kind_dir, path, &slug)),
            ContentKind::Blog => None,
        };

        let base = media_base(kind, group_key.as_deref());
        let expanded = expand_directives(body, &base);
        let html = self.renderer.render(&expanded);

        tracing::debug!("Loaded {} `{}` from {:?}", kind, slug, path);

        Ok(ContentRecord {
            slug,
            kind,
            front_matter,
            group_key,
            raw_body: body.to_string(),
            html,
            source: path
                .strip_prefix(content_root)
                .unwrap_or(path)
                .to_path_buf(),
        })
    }

    /// Render `content/about.md` if present. Front-matter is optional here.
    pub fn load_about(&self, content_root: &Path) -> Result<Option<String>, ContentError> {
        let path = content_root.join(ABOUT_FILE);
        if !path.is_file() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|source| ContentError::Io {
            path: path.clone(),
            source,
        })?;
        let body = match FrontMatter::split(&content) {
            Ok((_, body)) => body,
            Err(FrontMatterError::Missing) => content.as_str(),
            Err(source) => return Err(ContentError::FrontMatter { path, source }),
        };

        let body = expand_directives(body, &media_base(ContentKind::Blog, None));
        Ok(Some(self.renderer.render(&body)))
    }
}

/// `projectSlug` from front-matter, else the parent directory name, else
/// (file directly in `projects/`) the file's own slug
fn resolve_group_key(front_matter: &FrontMatter, kind_dir: &Path, path: &Path, slug: &str) -> String {
    if let Some(key) = &front_matter.project_slug {
        return key.clone();
    }
    match path.parent() {
        Some(parent) if parent != kind_dir => parent
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| slug.to_string()),
        _ => slug.to_string(),
    }
}

/// Fail on the first two records that share `key`
fn check_unique_slugs<F>(records: &[ContentRecord], key: F) -> Result<(), ContentError>
where
    F: Fn(&ContentRecord) -> String,
{
    let mut seen: HashMap<String, &Path> = HashMap::new();
    for record in records {
        let key = key(record);
        if let Some(first) = seen.insert(key.clone(), record.source.as_path()) {
            return Err(ContentError::DuplicateSlug {
                slug: key,
                first: first.to_path_buf(),
                second: record.source.clone(),
            });
        }
    }
    Ok(())
}

/// File stem, used as the record slug
fn file_slug(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled")
        .to_string()
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e, "md" | "mdx" | "markdown"))
        .unwrap_or(false)
}

fn is_demo_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with(DEMO_PREFIX))
        .unwrap_or(false)
}
