//! Initialize a new folio site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::config::{SiteConfig, DEFAULT_CONFIG_FILE};
use crate::Folio;

const SAMPLE_PROJECT: &str = r#"---
title: My First Project
date: {date}
description: What this project is about.
tags: [Getting Started]
isIndex: true
featured: true
---

Describe the project here. Dated updates go next to this file in the same
directory and show up on the project page, newest first.
"#;

const SAMPLE_UPDATE: &str = r#"---
title: First Update
date: {date}
tags: [Getting Started]
---

Progress notes for the project. Images placed in `img/` can be shown with a
gallery directive:

Gallery: photo-1.jpg, photo-2.jpg
"#;

const SAMPLE_POST: &str = r#"---
title: Hello World
date: {date}
description: The first post on this site.
tags: [Notes]
---

Welcome! Run `folio server` to preview the site and `folio build` to write
the static version to `dist/`.
"#;

/// Scaffold a site in `target_dir`. Existing files are left alone.
pub fn init_site(target_dir: &Path) -> Result<()> {
    for dir in [
        "content/projects/my-first-project/img",
        "content/blog/img",
        "assets/styles",
        "assets/static/js",
    ] {
        fs::create_dir_all(target_dir.join(dir))?;
    }

    let config = format!(
        "# folio configuration\n# Copy to config-user.yml for local overrides.\n\n{}",
        serde_yaml::to_string(&SiteConfig::default())?
    );
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();

    write_new(&target_dir.join(DEFAULT_CONFIG_FILE), &config)?;
    write_new(
        &target_dir.join("content/projects/my-first-project/index.md"),
        &SAMPLE_PROJECT.replace("{date}", &today),
    )?;
    write_new(
        &target_dir.join("content/projects/my-first-project/first-update.md"),
        &SAMPLE_UPDATE.replace("{date}", &today),
    )?;
    write_new(
        &target_dir.join("content/blog/hello-world.md"),
        &SAMPLE_POST.replace("{date}", &today),
    )?;
    write_new(&target_dir.join("assets/styles/main.css"), "")?;
    write_new(&target_dir.join("assets/styles/components.css"), "")?;

    Ok(())
}

fn write_new(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        tracing::info!("Keeping existing {:?}", path);
        return Ok(());
    }
    fs::write(path, contents)?;
    tracing::debug!("Created: {:?}", path);
    Ok(())
}

/// Run the init command with an existing folio instance
pub fn run(folio: &Folio) -> Result<()> {
    init_site(&folio.base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::BuildMode;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_a_loadable_site() {
        let dir = TempDir::new().unwrap();
        init_site(dir.path()).unwrap();

        assert!(dir.path().join(DEFAULT_CONFIG_FILE).is_file());
        assert!(dir.path().join("assets/static/js").is_dir());

        let folio = Folio::new(dir.path()).unwrap();
        assert_eq!(folio.config.site.name, SiteConfig::default().site.name);

        let site = folio.load_site(BuildMode::Dev).unwrap();
        assert_eq!(site.projects().len(), 1);
        assert_eq!(site.projects()[0].updates.len(), 1);
        assert_eq!(site.blog_posts().len(), 1);
    }

    #[test]
    fn test_init_keeps_existing_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "site:\n  name: Mine\n").unwrap();
        init_site(dir.path()).unwrap();
        let config = SiteConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.site.name, "Mine");
    }
}
