//! folio: a static site generator and dev server for project portfolios
//!
//! Markdown with YAML front-matter is loaded from `content/`, grouped into
//! projects (an index post plus dated updates) and blog posts, and rendered
//! with built-in Tera templates either live by the dev server or into a
//! static directory tree.

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod site;
pub mod templates;

#[cfg(test)]
mod test_helpers;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::{BuildMode, ContentLoader};
use site::Site;

/// The main folio application
#[derive(Debug, Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Markdown content (`content/`)
    pub content_dir: PathBuf,
    /// Output directory of the static build (`dist/`)
    pub output_dir: PathBuf,
    /// Stylesheets and scripts (`assets/`)
    pub assets_dir: PathBuf,
}

impl Folio {
    /// Create a new instance from a site directory, loading its config
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config = config::SiteConfig::load_from_dir(base_dir.as_ref())?;
        Ok(Self::with_config(base_dir, config))
    }

    /// Create an instance with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.build.content_dir);
        let output_dir = base_dir.join(&config.build.output_dir);
        let assets_dir = base_dir.join(&config.build.assets_dir);

        Self {
            config,
            base_dir,
            content_dir,
            output_dir,
            assets_dir,
        }
    }

    /// Load all content and aggregate it into a [`Site`]
    pub fn load_site(&self, mode: BuildMode) -> Result<Site> {
        let loader = ContentLoader::new(&self.config, mode);
        let records = loader.load_all(&self.content_dir)?;
        let about = loader.load_about(&self.content_dir)?;
        Ok(Site::new(records).with_about(about))
    }

    /// Initialize a new site
    pub fn init(&self) -> Result<()> {
        commands::init::run(self)
    }

    /// Build the static site
    pub fn build(&self, mode: BuildMode) -> Result<()> {
        commands::build::run(self, mode)
    }

    /// Remove the output directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
