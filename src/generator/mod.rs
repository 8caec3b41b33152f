//! Generator module - renders the whole site into a static directory
//!
//! Every file is rendered into memory first; the output directory is only
//! cleaned and written once all pages rendered successfully, so a content
//! error never leaves a half-written `dist/` behind.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::helpers::{build_url, iso_date, legacy_output_path, output_path, Page, UrlMode};
use crate::site::aggregate::media_dirs;
use crate::templates::Pages;
use crate::Folio;

/// A rendered file, relative to the output directory
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: String,
}

impl OutputFile {
    fn new(path: impl Into<PathBuf>, contents: String) -> Self {
        Self {
            path: path.into(),
            contents,
        }
    }
}

/// Totals written to `build-info.json`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub build_date: String,
    pub project_posts_count: usize,
    pub blog_posts_count: usize,
    pub projects_count: usize,
    pub tags_count: usize,
    pub build_type: &'static str,
    pub version: &'static str,
}

/// Static site generator
pub struct Generator {
    folio: Folio,
    pages: Pages,
}

impl Generator {
    pub fn new(folio: &Folio, pages: Pages) -> Self {
        Self {
            folio: folio.clone(),
            pages,
        }
    }

    /// Render and write the entire site
    pub fn generate(&self) -> Result<BuildInfo> {
        let files = self.render_all()?;
        check_output_paths(&files)?;
        let info = self.build_info();

        self.prepare_output_dir()?;
        self.write_files(&files)?;
        tracing::info!("Wrote {} files", files.len());

        self.copy_assets()?;
        self.copy_media()?;

        Ok(info)
    }

    /// Every generated file, in memory
    pub fn render_all(&self) -> Result<Vec<OutputFile>> {
        let mut files = Vec::new();
        let site = self.pages.site();
        let legacy = self.folio.config.build.legacy_paths;

        for page in [
            Page::Home,
            Page::About,
            Page::ProjectsIndex,
            Page::BlogIndex,
            Page::TagsIndex,
        ] {
            files.push(self.render_page(page)?);
        }

        for project in site.projects() {
            self.push_entity(&mut files, Page::Project(&project.slug), legacy)?;
        }
        tracing::info!("Generated {} project pages", site.projects().len());

        for post in site.blog_posts() {
            self.push_entity(&mut files, Page::BlogPost(&post.slug), legacy)?;
        }
        tracing::info!("Generated {} blog pages", site.blog_posts().len());

        let tag_keys = site.tag_keys();
        for key in &tag_keys {
            self.push_entity(&mut files, Page::Tag(key), legacy)?;
        }
        tracing::info!("Generated {} tag pages", tag_keys.len());

        // Served from arbitrary paths, so links must be root-absolute
        files.push(OutputFile::new(
            output_path(Page::NotFound),
            self.pages.render(Page::NotFound, UrlMode::static_absolute())?
                .unwrap_or_default(),
        ));

        files.push(OutputFile::new("robots.txt", self.robots_txt()));
        files.push(OutputFile::new("sitemap.xml", self.sitemap()));
        files.push(OutputFile::new(
            "build-info.json",
            serde_json::to_string_pretty(&self.build_info())?,
        ));
        if self.folio.config.build.htaccess {
            files.push(OutputFile::new(".htaccess", HTACCESS.to_string()));
        }

        Ok(files)
    }

    fn render_page(&self, page: Page<'_>) -> Result<OutputFile> {
        let html = self
            .pages
            .render(page, UrlMode::static_at(0))?
            .with_context(|| format!("Nothing to render for {:?}", page))?;
        Ok(OutputFile::new(output_path(page), html))
    }

    /// Entity page at its canonical path, plus the legacy copy
    fn push_entity(&self, files: &mut Vec<OutputFile>, page: Page<'_>, legacy: bool) -> Result<()> {
        let file = self.render_page(page)?;
        if legacy {
            if let Some(path) = legacy_output_path(page) {
                files.push(OutputFile::new(path, file.contents.clone()));
            }
        }
        tracing::debug!("Generated: {:?}", file.path);
        files.push(file);
        Ok(())
    }

    fn build_info(&self) -> BuildInfo {
        let site = self.pages.site();
        BuildInfo {
            build_date: chrono::Utc::now().to_rfc3339(),
            project_posts_count: site.project_post_count(),
            blog_posts_count: site.blog_posts().len(),
            projects_count: site.projects().len(),
            tags_count: site.tag_index().len(),
            build_type: "static",
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    fn robots_txt(&self) -> String {
        format!(
            "User-agent: *\nAllow: /\n\n# Sitemap\nSitemap: {}/sitemap.xml\n",
            self.folio.config.domain()
        )
    }

    /// Sitemap with clean URLs, matching the `.htaccess` rewrites
    fn sitemap(&self) -> String {
        let domain = self.folio.config.domain();
        let site = self.pages.site();
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");

        let mut push = |page: Page<'_>, lastmod: Option<String>, freq: &str, priority: &str| {
            xml.push_str("  <url>\n");
            xml.push_str(&format!(
                "    <loc>{}</loc>\n",
                escape_xml(&format!("{}{}", domain, build_url(page, UrlMode::LIVE)))
            ));
            if let Some(lastmod) = lastmod {
                xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod));
            }
            xml.push_str(&format!("    <changefreq>{}</changefreq>\n", freq));
            xml.push_str(&format!("    <priority>{}</priority>\n", priority));
            xml.push_str("  </url>\n");
        };

        push(Page::Home, None, "weekly", "1.0");
        push(Page::About, None, "monthly", "0.8");
        push(Page::ProjectsIndex, None, "weekly", "0.9");
        push(Page::BlogIndex, None, "weekly", "0.9");
        for project in site.projects() {
            push(
                Page::Project(&project.slug),
                Some(iso_date(&project.last_modified())),
                "yearly",
                "0.7",
            );
        }
        for post in site.blog_posts() {
            push(
                Page::BlogPost(&post.slug),
                Some(iso_date(&post.date())),
                "monthly",
                "0.8",
            );
        }

        xml.push_str("</urlset>\n");
        xml
    }

    /// Create the output directory, removing a previous build.
    ///
    /// Refuses to delete the site root or a directory holding its sources.
    fn prepare_output_dir(&self) -> Result<()> {
        let output = &self.folio.output_dir;
        let protected = [
            &self.folio.base_dir,
            &self.folio.content_dir,
            &self.folio.assets_dir,
        ];
        if protected.iter().any(|dir| dir.starts_with(output)) {
            bail!(
                "Refusing to clean output directory {:?}: it contains the site sources",
                output
            );
        }

        if output.exists() {
            fs::remove_dir_all(output)
                .with_context(|| format!("Failed to clean {:?}", output))?;
        }
        fs::create_dir_all(output)?;
        Ok(())
    }

    fn write_files(&self, files: &[OutputFile]) -> Result<()> {
        for file in files {
            let dest = self.folio.output_dir.join(&file.path);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, &file.contents)
                .with_context(|| format!("Failed to write {:?}", dest))?;
        }
        Ok(())
    }

    /// Copy `assets/` (styles, scripts) as-is
    fn copy_assets(&self) -> Result<()> {
        let assets = &self.folio.assets_dir;
        if !assets.is_dir() {
            tracing::warn!("Assets directory {:?} not found, skipping", assets);
            return Ok(());
        }
        let copied = copy_dir(assets, &self.folio.output_dir)?;
        tracing::info!("Copied {} asset files", copied);
        Ok(())
    }

    /// Copy project and blog images under `media/`
    fn copy_media(&self) -> Result<()> {
        let media = self.folio.output_dir.join("media");
        let mut copied = 0;

        for (slug, dir) in media_dirs(self.pages.site().projects(), &self.folio.content_dir) {
            copied += copy_dir(&dir, &media.join("projects").join(slug))?;
        }

        let blog_img = self.folio.content_dir.join("blog").join("img");
        if blog_img.is_dir() {
            copied += copy_dir(&blog_img, &media.join("blog"))?;
        }

        tracing::info!("Copied {} media files", copied);
        Ok(())
    }
}

/// Every generated path must stay below the output directory
fn check_output_paths(files: &[OutputFile]) -> Result<()> {
    for file in files {
        if !file
            .path
            .components()
            .all(|c| matches!(c, std::path::Component::Normal(_)))
        {
            bail!("Refusing to write {:?} outside the output directory", file.path);
        }
    }
    Ok(())
}

/// Recursively copy the files below `src` into `dest`; returns the count
fn copy_dir(src: &Path, dest: &Path) -> Result<usize> {
    let mut count = 0;
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry below {:?}: {}", src, e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(src)?;
        let target = dest.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &target)
            .with_context(|| format!("Failed to copy {:?}", entry.path()))?;
        count += 1;
    }
    Ok(count)
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Apache rules for clean URLs on a plain static host
const HTACCESS: &str = r#"# folio - Clean URLs and Apache Configuration
RewriteEngine On

# Remove .html extension from URLs
RewriteCond %{REQUEST_FILENAME} !-d
RewriteCond %{REQUEST_FILENAME} !-f
RewriteRule ^([^.]+)$ $1.html [NC,L]

# Redirect .html URLs to clean URLs
RewriteCond %{THE_REQUEST} /([^.]+)\.html [NC]
RewriteRule ^ /%1 [NC,L,R=301]

# Entity pages
RewriteRule ^projects/([^/]+)/?$ projects/$1.html [NC,L]
RewriteRule ^articles/([^/]+)/?$ articles/$1.html [NC,L]
RewriteRule ^topics/([^/]+)/?$ topics/$1.html [NC,L]

# Older locations
RewriteRule ^posts/([^/]+)/?$ posts/$1.html [NC,L]
RewriteRule ^tags/([^/]+)/?$ tags/$1.html [NC,L]

ErrorDocument 404 /404.html

# Security headers
<IfModule mod_headers.c>
    Header always set X-Content-Type-Options nosniff
    Header always set X-Frame-Options DENY
    Header always set X-XSS-Protection "1; mode=block"
    Header always set Referrer-Policy "strict-origin-when-cross-origin"
    Header always set Permissions-Policy "geolocation=(), microphone=(), camera=()"
</IfModule>

# Cache static assets
<IfModule mod_expires.c>
    ExpiresActive On
    ExpiresByType text/css "access plus 1 month"
    ExpiresByType application/javascript "access plus 1 month"
    ExpiresByType image/png "access plus 6 months"
    ExpiresByType image/jpg "access plus 6 months"
    ExpiresByType image/jpeg "access plus 6 months"
    ExpiresByType image/gif "access plus 6 months"
    ExpiresByType image/svg+xml "access plus 6 months"
    ExpiresByType application/pdf "access plus 1 month"
</IfModule>

# Gzip compression
<IfModule mod_deflate.c>
    AddOutputFilterByType DEFLATE text/plain
    AddOutputFilterByType DEFLATE text/html
    AddOutputFilterByType DEFLATE text/xml
    AddOutputFilterByType DEFLATE text/css
    AddOutputFilterByType DEFLATE application/xml
    AddOutputFilterByType DEFLATE application/xhtml+xml
    AddOutputFilterByType DEFLATE application/javascript
</IfModule>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::site::Site;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn folio_in(dir: &Path) -> Folio {
        Folio::with_config(dir, SiteConfig::default())
    }

    fn generator(folio: &Folio) -> Generator {
        let pages = Pages::new(Site::new(sample_records()), folio.config.clone()).unwrap();
        Generator::new(folio, pages)
    }

    fn paths(files: &[OutputFile]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.path.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_render_all_layout() {
        let dir = TempDir::new().unwrap();
        let folio = folio_in(dir.path());
        let files = generator(&folio).render_all().unwrap();
        let paths = paths(&files);

        for expected in [
            "index.html",
            "about.html",
            "posts.html",
            "blog.html",
            "tags.html",
            "404.html",
            "projects/weather-station.html",
            "posts/weather-station.html",
            "articles/async-notes.html",
            "blog/async-notes.html",
            "topics/web development.html",
            "tags/web development.html",
            "robots.txt",
            "sitemap.xml",
            "build-info.json",
            ".htaccess",
        ] {
            assert!(paths.iter().any(|p| p == expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_legacy_copies_are_identical_and_optional() {
        let dir = TempDir::new().unwrap();
        let mut folio = folio_in(dir.path());
        let files = generator(&folio).render_all().unwrap();
        let find = |p: &str| {
            files
                .iter()
                .find(|f| f.path == Path::new(p))
                .map(|f| f.contents.clone())
                .unwrap()
        };
        assert_eq!(find("projects/plc-bridge.html"), find("posts/plc-bridge.html"));

        folio.config.build.legacy_paths = false;
        folio.config.build.htaccess = false;
        let paths = paths(&generator(&folio).render_all().unwrap());
        assert!(!paths.iter().any(|p| p.starts_with("posts/")));
        assert!(!paths.iter().any(|p| p == ".htaccess"));
    }

    #[test]
    fn test_sitemap_and_robots() {
        let dir = TempDir::new().unwrap();
        let mut folio = folio_in(dir.path());
        folio.config.site.domain = "https://ada.dev/".to_string();
        let gen = generator(&folio);

        let robots = gen.robots_txt();
        assert!(robots.contains("Sitemap: https://ada.dev/sitemap.xml"));

        let sitemap = gen.sitemap();
        assert!(sitemap.contains("<loc>https://ada.dev/</loc>"));
        assert!(sitemap.contains("<loc>https://ada.dev/posts</loc>"));
        assert!(sitemap.contains("<loc>https://ada.dev/projects/weather-station</loc>"));
        assert!(sitemap.contains("<loc>https://ada.dev/articles/untagged</loc>"));
        // project lastmod is its newest post
        assert!(sitemap.contains("<lastmod>2024-03-01</lastmod>"));
        assert_eq!(sitemap.matches("<url>").count(), 4 + 2 + 3);
    }

    #[test]
    fn test_build_info() {
        let dir = TempDir::new().unwrap();
        let folio = folio_in(dir.path());
        let info = generator(&folio).build_info();
        let json: serde_json::Value = serde_json::to_value(&info).unwrap();
        assert_eq!(json["projectPostsCount"], 4);
        assert_eq!(json["blogPostsCount"], 3);
        assert_eq!(json["projectsCount"], 2);
        assert_eq!(json["tagsCount"], 5);
        assert_eq!(json["buildType"], "static");
    }

    #[test]
    fn test_generate_writes_and_copies() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("assets/styles")).unwrap();
        fs::write(root.join("assets/styles/main.css"), "body{}").unwrap();
        fs::create_dir_all(root.join("content/projects/weather-station/img")).unwrap();
        fs::write(root.join("content/projects/weather-station/img/a.png"), "png").unwrap();
        fs::create_dir_all(root.join("content/blog/img")).unwrap();
        fs::write(root.join("content/blog/img/b.jpg"), "jpg").unwrap();
        fs::create_dir_all(root.join("dist")).unwrap();
        fs::write(root.join("dist/stale.html"), "old").unwrap();

        let folio = folio_in(root);
        let info = generator(&folio).generate().unwrap();
        assert_eq!(info.projects_count, 2);

        let dist = root.join("dist");
        assert!(!dist.join("stale.html").exists());
        assert!(dist.join("index.html").is_file());
        assert!(dist.join("topics/rust.html").is_file());
        assert_eq!(fs::read_to_string(dist.join("styles/main.css")).unwrap(), "body{}");
        assert!(dist.join("media/projects/weather-station/a.png").is_file());
        assert!(dist.join("media/blog/b.jpg").is_file());
    }

    #[test]
    fn test_refuses_to_clean_site_root() {
        let dir = TempDir::new().unwrap();
        let mut folio = folio_in(dir.path());
        folio.output_dir = folio.base_dir.clone();
        assert!(generator(&folio).generate().is_err());
    }

    #[test]
    fn test_escaping_output_path_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let folio = folio_in(dir.path());
        let mut records = sample_records();
        records.push(tagged(blog_post("sneaky", "2024-05-01"), &["../../outside"]));
        let pages = Pages::new(Site::new(records), folio.config.clone()).unwrap();

        assert!(Generator::new(&folio, pages).generate().is_err());
        assert!(!folio.output_dir.exists());
        assert!(!dir.path().join("outside.html").exists());
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a&b<c>"), "a&amp;b&lt;c&gt;");
    }
}
