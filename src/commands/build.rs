//! Build the static site

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::config::{DEFAULT_CONFIG_FILE, USER_CONFIG_FILE};
use crate::content::BuildMode;
use crate::generator::Generator;
use crate::templates::Pages;
use crate::Folio;

/// Load content, render every page and write the output directory
pub fn run(folio: &Folio, mode: BuildMode) -> Result<()> {
    let start = Instant::now();

    let site = folio.load_site(mode)?;
    tracing::info!(
        "Loaded {} projects ({} posts) and {} blog posts",
        site.projects().len(),
        site.project_post_count(),
        site.blog_posts().len()
    );

    let pages = Pages::new(site, folio.config.clone())?;
    let info = Generator::new(folio, pages).generate()?;

    tracing::info!(
        "Built {} projects, {} blog posts and {} tags into {:?} in {:.2}s",
        info.projects_count,
        info.blog_posts_count,
        info.tags_count,
        folio.output_dir,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Rebuild whenever content, assets or config change.
///
/// Each rebuild reloads the configuration and starts from a fresh snapshot.
pub fn watch(folio: &Folio, mode: BuildMode) -> Result<()> {
    let (tx, rx) = channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for dir in [&folio.content_dir, &folio.assets_dir] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }
    for name in [USER_CONFIG_FILE, DEFAULT_CONFIG_FILE] {
        let path = folio.base_dir.join(name);
        if path.exists() {
            debouncer
                .watcher()
                .watch(&path, RecursiveMode::NonRecursive)?;
            tracing::debug!("Watching: {:?}", path);
        }
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed: Vec<_> = events
                    .iter()
                    .filter(|e| is_relevant(&e.path, &folio.output_dir))
                    .collect();
                if changed.is_empty() {
                    continue;
                }
                for event in &changed {
                    tracing::info!("File changed: {}", event.path.display());
                }

                let result = Folio::new(&folio.base_dir).and_then(|fresh| run(&fresh, mode));
                if let Err(e) = result {
                    tracing::error!("Build failed: {:#}", e);
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Editor droppings and our own output never trigger a rebuild
fn is_relevant(path: &Path, output_dir: &Path) -> bool {
    let path_str = path.to_string_lossy();
    !path.starts_with(output_dir)
        && !path.components().any(|c| c.as_os_str() == ".git")
        && path.file_name().map_or(true, |name| name != ".DS_Store")
        && !path_str.ends_with('~')
        && !path_str.ends_with(".swp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_build_end_to_end() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("content/projects/rover")).unwrap();
        fs::create_dir_all(root.join("content/blog")).unwrap();
        fs::write(
            root.join("content/projects/rover/index.md"),
            "---\ntitle: Rover\ndate: 2024-01-01\nisIndex: true\n---\nHello",
        )
        .unwrap();
        fs::write(
            root.join("content/blog/first.md"),
            "---\ntitle: First\ndate: 2024-01-02\ntags: [Notes]\n---\nHi",
        )
        .unwrap();
        fs::write(
            root.join("content/blog/demo-sample.md"),
            "---\ntitle: Demo\ndate: 2024-01-03\n---\nSample",
        )
        .unwrap();

        let folio = Folio::new(root).unwrap();
        run(&folio, BuildMode::Release).unwrap();

        let dist = root.join("dist");
        assert!(dist.join("projects/rover.html").is_file());
        assert!(dist.join("articles/first.html").is_file());
        assert!(dist.join("topics/notes.html").is_file());
        assert!(!dist.join("articles/demo-sample.html").exists());

        let info = fs::read_to_string(dist.join("build-info.json")).unwrap();
        assert!(info.contains("\"blogPostsCount\": 1"));
    }

    #[test]
    fn test_broken_content_leaves_output_untouched() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("content/blog")).unwrap();
        fs::write(root.join("content/blog/bad.md"), "---\ntitle: [oops\n---\n").unwrap();
        fs::create_dir_all(root.join("dist")).unwrap();
        fs::write(root.join("dist/index.html"), "previous").unwrap();

        let folio = Folio::new(root).unwrap();
        assert!(run(&folio, BuildMode::Dev).is_err());
        assert_eq!(
            fs::read_to_string(root.join("dist/index.html")).unwrap(),
            "previous"
        );
    }

    #[test]
    fn test_is_relevant() {
        let out = Path::new("/site/dist");
        assert!(is_relevant(Path::new("/site/content/blog/a.md"), out));
        assert!(!is_relevant(Path::new("/site/dist/index.html"), out));
        assert!(!is_relevant(Path::new("/site/content/blog/a.md~"), out));
        assert!(!is_relevant(Path::new("/site/.git/HEAD"), out));
        assert!(!is_relevant(Path::new("/site/content/.DS_Store"), out));
        assert!(is_relevant(Path::new("/site/content/blog/my.github-notes.md"), out));
        assert!(is_relevant(Path::new("/site/content/projects/.gitops/index.md"), out));
    }
}
