//! Site configuration (config-user.yml / config-default.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// User overrides, not tracked by version control
pub const USER_CONFIG_FILE: &str = "config-user.yml";

/// Shipped defaults
pub const DEFAULT_CONFIG_FILE: &str = "config-default.yml";

/// Main site configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub site: SiteSection,
    pub navigation: NavigationConfig,
    pub pages: PagesConfig,
    pub server: ServerConfig,
    /// Contact links rendered on the about page (email, github, ...)
    pub contact: BTreeMap<String, String>,
    pub build: BuildConfig,
    pub highlight: HighlightConfig,
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }

    /// Resolve the configuration for a site directory.
    ///
    /// `config-user.yml` wins over `config-default.yml`; with neither present
    /// the built-in defaults are used. A file that exists but does not parse
    /// is an error.
    pub fn load_from_dir<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        match Self::locate(base_dir.as_ref()) {
            Some(path) => {
                let config = Self::load(&path)?;
                tracing::info!("Using {:?}", path);
                Ok(config)
            }
            None => {
                tracing::info!(
                    "No {} or {} found, using built-in defaults",
                    USER_CONFIG_FILE,
                    DEFAULT_CONFIG_FILE
                );
                Ok(Self::default())
            }
        }
    }

    /// Path of the config file that would be loaded, if any
    pub fn locate(base_dir: &Path) -> Option<PathBuf> {
        [USER_CONFIG_FILE, DEFAULT_CONFIG_FILE]
            .iter()
            .map(|name| base_dir.join(name))
            .find(|path| path.is_file())
    }

    /// Domain used for absolute links (sitemap, robots.txt), without trailing slash
    pub fn domain(&self) -> &str {
        self.site.domain.trim_end_matches('/')
    }
}

/// Site identity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    pub name: String,
    pub subtitle: String,
    pub footer: String,
    pub show_generator_credit: bool,
    pub domain: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            name: "Your Name".to_string(),
            subtitle: "Projects & Notes".to_string(),
            footer: "Built from plain markdown files.".to_string(),
            show_generator_credit: true,
            domain: "https://example.com".to_string(),
        }
    }
}

/// Navigation labels and behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub home: String,
    pub projects: String,
    pub blog: String,
    pub about: String,
    pub floating_nav: bool,
    pub sticky_header: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            home: "Home".to_string(),
            projects: "Projects".to_string(),
            blog: "Blog".to_string(),
            about: "About".to_string(),
            floating_nav: true,
            sticky_header: true,
        }
    }
}

/// Titles and intro copy of the listing pages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PagesConfig {
    pub home: HomePageConfig,
    pub blog: ListingPageConfig,
    pub projects: ListingPageConfig,
    pub about: AboutPageConfig,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            home: HomePageConfig::default(),
            blog: ListingPageConfig {
                title: "Blog".to_string(),
                description: "Thoughts, tutorials and notes.".to_string(),
            },
            projects: ListingPageConfig {
                title: "All Projects".to_string(),
                description: "Projects with their ongoing updates.".to_string(),
            },
            about: AboutPageConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HomePageConfig {
    pub headline: String,
    pub intro: String,
}

impl Default for HomePageConfig {
    fn default() -> Self {
        Self {
            headline: "Welcome".to_string(),
            intro: "A portfolio of projects and the notes written along the way.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingPageConfig {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AboutPageConfig {
    pub title: String,
}

impl Default for AboutPageConfig {
    fn default() -> Self {
        Self {
            title: "About".to_string(),
        }
    }
}

/// Dev server defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 8000,
        }
    }
}

/// Directory layout and static build switches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub content_dir: String,
    pub output_dir: String,
    pub assets_dir: String,
    /// Number of projects / blog posts considered "recent" for the homepage
    pub recent_limit: usize,
    /// Also write entity pages under posts/, blog/ and tags/
    pub legacy_paths: bool,
    /// Emit an Apache .htaccess with clean URL rewrites
    pub htaccess: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            content_dir: "content".to_string(),
            output_dir: "dist".to_string(),
            assets_dir: "assets".to_string(),
            recent_limit: 5,
            legacy_paths: true,
            htaccess: true,
        }
    }
}

/// Code block highlighting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.navigation.home, "Home");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.build.output_dir, "dist");
        assert!(config.build.legacy_paths);
    }

    #[test]
    fn test_parse_partial_config() {
        let yaml = r#"
site:
  name: Ada Lovelace
  domain: https://ada.dev/
navigation:
  blog: Notes
contact:
  github: https://github.com/ada
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.site.name, "Ada Lovelace");
        assert_eq!(config.domain(), "https://ada.dev");
        assert_eq!(config.navigation.blog, "Notes");
        // untouched keys keep their defaults
        assert_eq!(config.navigation.projects, "Projects");
        assert_eq!(config.site.subtitle, "Projects & Notes");
        assert_eq!(config.contact["github"], "https://github.com/ada");
    }

    #[test]
    fn test_user_config_wins() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "site:\n  name: Default\n").unwrap();
        fs::write(dir.path().join(USER_CONFIG_FILE), "site:\n  name: User\n").unwrap();

        let config = SiteConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.site.name, "User");
    }

    #[test]
    fn test_falls_back_to_default_file_then_builtin() {
        let dir = TempDir::new().unwrap();
        let config = SiteConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.site.name, "Your Name");

        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "site:\n  name: Default\n").unwrap();
        let config = SiteConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.site.name, "Default");
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(USER_CONFIG_FILE), "site: [unclosed\n").unwrap();
        assert!(SiteConfig::load_from_dir(dir.path()).is_err());
    }
}
