//! Create a new project post or blog post

use anyhow::{bail, Result};
use std::fs;
use std::path::PathBuf;

use crate::content::ContentKind;
use crate::Folio;

/// What `folio new` should create
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    /// Project the post belongs to; defaults to the title's slug for an index post
    pub project: Option<String>,
    /// Create the project's index post
    pub index: bool,
}

/// Write a front-matter skeleton and return its path
pub fn create_post(folio: &Folio, kind: ContentKind, post: &NewPost) -> Result<PathBuf> {
    let slug = slug::slugify(&post.title);
    if slug.is_empty() {
        bail!("Title {:?} does not produce a usable file name", post.title);
    }

    let kind_dir = folio.content_dir.join(kind.dir_name());
    let file_path = match kind {
        ContentKind::Blog => kind_dir.join(format!("{}.md", slug)),
        ContentKind::Project => {
            let project = match (&post.project, post.index) {
                (Some(project), _) => slug::slugify(project),
                (None, true) => slug.clone(),
                (None, false) => bail!("Project updates need --project <slug>"),
            };
            let file_name = if post.index {
                "index.md".to_string()
            } else {
                format!("{}.md", slug)
            };
            kind_dir.join(project).join(file_name)
        }
    };

    if file_path.exists() {
        bail!("File already exists: {:?}", file_path);
    }
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&file_path, skeleton(post))?;
    tracing::info!("Created: {:?}", file_path);
    Ok(file_path)
}

fn skeleton(post: &NewPost) -> String {
    let now = chrono::Local::now();
    let mut out = String::from("---\n");
    out.push_str(&format!("title: {}\n", yaml_string(&post.title)));
    out.push_str(&format!("date: {}\n", now.format("%Y-%m-%d")));
    out.push_str("description: \"\"\n");
    out.push_str("tags: []\n");
    if post.index {
        out.push_str("isIndex: true\n");
    }
    out.push_str("---\n\n");
    out
}

/// Double-quoted YAML scalar
fn yaml_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::{BuildMode, FrontMatter};
    use tempfile::TempDir;

    fn folio(dir: &TempDir) -> Folio {
        Folio::with_config(dir.path(), SiteConfig::default())
    }

    #[test]
    fn test_new_blog_post() {
        let dir = TempDir::new().unwrap();
        let folio = folio(&dir);
        let post = NewPost {
            title: "Hello, \"Async\" World".to_string(),
            ..Default::default()
        };
        let path = create_post(&folio, ContentKind::Blog, &post).unwrap();
        assert_eq!(path, folio.content_dir.join("blog/hello-async-world.md"));

        let content = fs::read_to_string(&path).unwrap();
        let (fm, _) = FrontMatter::parse(&content).unwrap();
        assert_eq!(fm.title, "Hello, \"Async\" World");
        assert!(!fm.is_index);

        assert!(create_post(&folio, ContentKind::Blog, &post).is_err());
    }

    #[test]
    fn test_new_project_index_and_update() {
        let dir = TempDir::new().unwrap();
        let folio = folio(&dir);

        let index = NewPost {
            title: "Weather Station".to_string(),
            index: true,
            ..Default::default()
        };
        let path = create_post(&folio, ContentKind::Project, &index).unwrap();
        assert_eq!(path, folio.content_dir.join("projects/weather-station/index.md"));

        let update = NewPost {
            title: "New Sensors".to_string(),
            project: Some("weather-station".to_string()),
            index: false,
        };
        let path = create_post(&folio, ContentKind::Project, &update).unwrap();
        assert_eq!(path, folio.content_dir.join("projects/weather-station/new-sensors.md"));

        let site = folio.load_site(BuildMode::Dev).unwrap();
        let project = site.project_by_slug("weather-station").unwrap();
        assert_eq!(project.index_post.slug, "index");
        assert_eq!(project.updates.len(), 1);
    }

    #[test]
    fn test_update_needs_a_project() {
        let dir = TempDir::new().unwrap();
        let post = NewPost {
            title: "Orphan".to_string(),
            ..Default::default()
        };
        assert!(create_post(&folio(&dir), ContentKind::Project, &post).is_err());
    }
}
