//! Page renderer shared by the dev server and the static build

use anyhow::{Context as _, Result};
use chrono::Datelike;
use tera::Context;

use super::data::*;
use super::TemplateRenderer;
use crate::config::SiteConfig;
use crate::content::{ContentKind, ContentRecord};
use crate::helpers::{asset_url, build_url, html_escape, iso_date, meta_generator, Page, UrlMode};
use crate::site::{select_homepage, Project, Site};

/// What a 404 page is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFound {
    Page,
    Project,
    BlogPost,
    Tag,
}

impl NotFound {
    fn heading(&self) -> &'static str {
        match self {
            NotFound::Page => "404 - Page Not Found",
            NotFound::Project => "404 - Project Not Found",
            NotFound::BlogPost => "404 - Blog Post Not Found",
            NotFound::Tag => "404 - Tag Not Found",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            NotFound::Page => "The page you're looking for doesn't exist.",
            NotFound::Project => "The project you're looking for doesn't exist.",
            NotFound::BlogPost => "The blog post you're looking for doesn't exist.",
            NotFound::Tag => "No posts use this tag.",
        }
    }
}

/// Renders every page of a [`Site`]
pub struct Pages {
    renderer: TemplateRenderer,
    site: Site,
    config: SiteConfig,
}

impl Pages {
    pub fn new(site: Site, config: SiteConfig) -> Result<Self> {
        Ok(Self {
            renderer: TemplateRenderer::new()?,
            site,
            config,
        })
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Render `page`; `None` when the slug or tag does not exist
    pub fn render(&self, page: Page<'_>, mode: UrlMode) -> Result<Option<String>> {
        match page {
            Page::Home => self.home(mode).map(Some),
            Page::About => self.about(mode).map(Some),
            Page::ProjectsIndex => self.projects_index(mode).map(Some),
            Page::BlogIndex => self.blog_index(mode).map(Some),
            Page::TagsIndex => self.tags_index(mode).map(Some),
            Page::NotFound => self.not_found(NotFound::Page, mode).map(Some),
            Page::Project(slug) => self.project(slug, mode),
            Page::BlogPost(slug) => self.blog_post(slug, mode),
            Page::Tag(tag) => self.tag(tag, mode),
        }
    }

    pub fn home(&self, mode: UrlMode) -> Result<String> {
        let page = Page::Home;
        let mode = mode.for_page(&page);
        let limit = self.config.build.recent_limit;
        let (projects, blog) = select_homepage(
            self.site.recent_projects(limit),
            self.site.recent_blog_posts(limit),
        );

        let mut cards: Vec<PostCard> = projects.iter().map(|p| self.project_card(p, mode)).collect();
        cards.extend(blog.iter().map(|p| self.post_card(p, mode)));

        let mut ctx = self.context(&page, "Home", mode, false);
        ctx.insert("headline", &html_escape(&self.config.pages.home.headline));
        ctx.insert("intro", &html_escape(&self.config.pages.home.intro));
        ctx.insert("cards", &cards);
        ctx.insert("show_projects_link", &!projects.is_empty());
        ctx.insert("show_blog_link", &!blog.is_empty());
        self.renderer.render("home.html", &ctx)
    }

    pub fn about(&self, mode: UrlMode) -> Result<String> {
        let page = Page::About;
        let mode = mode.for_page(&page);
        let title = &self.config.pages.about.title;

        let contacts: Vec<ContactLink> = self
            .config
            .contact
            .iter()
            .map(|(label, target)| contact_link(label, target))
            .collect();

        let mut ctx = self.context(&page, title, mode, false);
        ctx.insert("heading", &html_escape(title));
        ctx.insert("about_html", &self.site.about_html());
        ctx.insert("project_count", &self.site.projects().len());
        ctx.insert("blog_count", &self.site.blog_posts().len());
        ctx.insert("contacts", &contacts);
        self.renderer.render("about.html", &ctx)
    }

    pub fn projects_index(&self, mode: UrlMode) -> Result<String> {
        let page = Page::ProjectsIndex;
        let mode = mode.for_page(&page);
        let listing = &self.config.pages.projects;

        let cards: Vec<PostCard> = self
            .site
            .projects()
            .iter()
            .map(|p| self.project_card(p, mode))
            .collect();

        let mut ctx = self.context(&page, &listing.title, mode, false);
        ctx.insert("heading", &html_escape(&listing.title));
        ctx.insert("description", &html_escape(&listing.description));
        ctx.insert("cards", &cards);
        self.renderer.render("projects.html", &ctx)
    }

    pub fn project(&self, slug: &str, mode: UrlMode) -> Result<Option<String>> {
        let Some(project) = self.site.project_by_slug(slug) else {
            return Ok(None);
        };
        let page = Page::Project(&project.slug);
        let mode = mode.for_page(&page);
        let index = &project.index_post;
        let fm = &index.front_matter;

        let gantt_json = match &fm.gantt {
            Some(tasks) if !tasks.is_empty() => {
                serde_json::to_string(tasks).context("Failed to serialize Gantt tasks")?
            }
            _ => "null".to_string(),
        };

        let updates: Vec<UpdateView> = project
            .updates
            .iter()
            .map(|u| UpdateView {
                anchor: update_anchor(&u.slug),
                title: html_escape(u.title()),
                date: iso_date(&u.date()),
                tags: self.tag_links(u, mode),
                html: u.html.clone(),
            })
            .collect();

        let view = ProjectView {
            title: html_escape(index.title()),
            date: iso_date(&index.date()),
            description: html_escape(fm.description.as_deref().unwrap_or_default()),
            tags: self.tag_links(index, mode),
            html: index.html.clone(),
            has_gantt: fm.gantt.is_some(),
            gantt_json: html_escape(&gantt_json),
            latest_update: project.latest_update().map(|u| LatestUpdate {
                anchor: update_anchor(&u.slug),
                date: iso_date(&u.date()),
            }),
            updates,
            timeline: fm
                .timeline
                .iter()
                .map(|event| TimelineItem {
                    title: html_escape(&event.title),
                    date: event.date.format("%Y-%m-%d").to_string(),
                    href: html_escape(event.link.as_deref().unwrap_or("#")),
                })
                .collect(),
        };

        let widgets = project.has_gantt() || project.has_timeline();
        let mut ctx = self.context(&page, index.title(), mode, widgets);
        ctx.insert("project", &view);
        self.renderer.render("project.html", &ctx).map(Some)
    }

    pub fn blog_index(&self, mode: UrlMode) -> Result<String> {
        let page = Page::BlogIndex;
        let mode = mode.for_page(&page);
        let listing = &self.config.pages.blog;

        let cards: Vec<PostCard> = self
            .site
            .blog_posts()
            .iter()
            .map(|p| self.post_card(p, mode))
            .collect();

        let mut ctx = self.context(&page, &listing.title, mode, false);
        ctx.insert("heading", &html_escape(&listing.title));
        ctx.insert("description", &html_escape(&listing.description));
        ctx.insert("cards", &cards);
        self.renderer.render("blog.html", &ctx)
    }

    pub fn blog_post(&self, slug: &str, mode: UrlMode) -> Result<Option<String>> {
        let Some(post) = self.site.blog_post_by_slug(slug) else {
            return Ok(None);
        };
        let page = Page::BlogPost(&post.slug);
        let mode = mode.for_page(&page);

        let view = ArticleView {
            title: html_escape(post.title()),
            date: iso_date(&post.date()),
            description: html_escape(post.front_matter.description.as_deref().unwrap_or_default()),
            tags: self.tag_links(post, mode),
            html: post.html.clone(),
        };

        let mut ctx = self.context(&page, post.title(), mode, false);
        ctx.insert("article", &view);
        self.renderer.render("article.html", &ctx).map(Some)
    }

    pub fn tags_index(&self, mode: UrlMode) -> Result<String> {
        let page = Page::TagsIndex;
        let mode = mode.for_page(&page);

        let tags: Vec<TagCard> = self
            .site
            .all_tags()
            .into_iter()
            .map(|t| TagCard {
                href: build_url(Page::Tag(&t.name), mode),
                name: html_escape(&t.name),
                count: t.count,
            })
            .collect();

        let mut ctx = self.context(&page, "Tags", mode, false);
        ctx.insert("tags", &tags);
        self.renderer.render("tags.html", &ctx)
    }

    /// Posts tagged `tag`; `None` when no post uses it
    pub fn tag(&self, tag: &str, mode: UrlMode) -> Result<Option<String>> {
        let Some(name) = self.site.tag_display_name(tag) else {
            return Ok(None);
        };
        let page = Page::Tag(name);
        let mode = mode.for_page(&page);

        let cards: Vec<PostCard> = self
            .site
            .posts_by_tag(name)
            .into_iter()
            .map(|p| self.post_card(p, mode))
            .collect();

        let mut ctx = self.context(&page, &format!("{} - Tags", name), mode, false);
        ctx.insert("tag_name", &html_escape(name));
        ctx.insert("cards", &cards);
        self.renderer.render("tag.html", &ctx).map(Some)
    }

    pub fn not_found(&self, what: NotFound, mode: UrlMode) -> Result<String> {
        let page = Page::NotFound;
        let mode = mode.for_page(&page);

        let mut ctx = self.context(&page, "Page Not Found", mode, false);
        ctx.insert("heading", what.heading());
        ctx.insert("message", what.message());
        let (back_label, back_page) = match what {
            NotFound::BlogPost => ("View Blog", Page::BlogIndex),
            NotFound::Tag => ("All Tags", Page::TagsIndex),
            _ => ("View Projects", Page::ProjectsIndex),
        };
        ctx.insert("back_label", back_label);
        ctx.insert("back_href", &build_url(back_page, mode));
        self.renderer.render("not_found.html", &ctx)
    }

    /// Context shared by every page: layout data and common links
    fn context(&self, page: &Page<'_>, title: &str, mode: UrlMode, project_widgets: bool) -> Context {
        let nav = &self.config.navigation;
        let mut links = vec![NavLink {
            label: html_escape(&nav.home),
            href: build_url(Page::Home, mode),
            icon: "&#127968;",
            active: *page == Page::Home,
        }];
        if !self.site.projects().is_empty() {
            links.push(NavLink {
                label: html_escape(&nav.projects),
                href: build_url(Page::ProjectsIndex, mode),
                icon: "&#128188;",
                active: matches!(page, Page::ProjectsIndex | Page::Project(_)),
            });
        }
        if !self.site.blog_posts().is_empty() {
            links.push(NavLink {
                label: html_escape(&nav.blog),
                href: build_url(Page::BlogIndex, mode),
                icon: "&#128221;",
                active: matches!(page, Page::BlogIndex | Page::BlogPost(_)),
            });
        }
        links.push(NavLink {
            label: html_escape(&nav.about),
            href: build_url(Page::About, mode),
            icon: "&#128100;",
            active: *page == Page::About,
        });

        let site = &self.config.site;
        let layout = LayoutData {
            title: html_escape(&format!("{} | {}", title, site.name)),
            site_name: html_escape(&site.name),
            site_subtitle: html_escape(&site.subtitle),
            footer: html_escape(&site.footer),
            show_generator_credit: site.show_generator_credit,
            year: chrono::Local::now().year(),
            nav: NavData {
                home_href: build_url(Page::Home, mode),
                links,
                floating: nav.floating_nav,
                sticky: nav.sticky_header,
            },
            assets: AssetUrls {
                main_css: asset_url("styles/main.css", mode),
                components_css: asset_url("styles/components.css", mode),
                components_js: asset_url("static/js/components.js", mode),
                gallery_js: asset_url("static/js/gallery.js", mode),
                gantt_js: asset_url("static/js/gantt.js", mode),
                timeline_js: asset_url("static/js/timeline.js", mode),
            },
            project_widgets,
            meta_generator: meta_generator(),
        };

        let mut ctx = Context::new();
        ctx.insert("layout", &layout);
        ctx.insert(
            "links",
            &PageLinks {
                home: build_url(Page::Home, mode),
                projects: build_url(Page::ProjectsIndex, mode),
                blog: build_url(Page::BlogIndex, mode),
                tags: build_url(Page::TagsIndex, mode),
            },
        );
        ctx
    }

    fn tag_links(&self, record: &ContentRecord, mode: UrlMode) -> Vec<TagLink> {
        record
            .tags()
            .iter()
            .map(|t| TagLink {
                name: html_escape(t),
                href: build_url(Page::Tag(t), mode),
            })
            .collect()
    }

    fn project_card(&self, project: &Project, mode: UrlMode) -> PostCard {
        let index = &project.index_post;
        PostCard {
            kind: ContentKind::Project.label(),
            title: html_escape(project.title()),
            href: build_url(Page::Project(&project.slug), mode),
            date: iso_date(&project.date()),
            description: html_escape(index.front_matter.description.as_deref().unwrap_or_default()),
            body_html: index.html.clone(),
            tags: self.tag_links(index, mode),
            featured: index.front_matter.featured,
            update_count: project.updates.len(),
            latest_update: project.latest_update().map(|u| iso_date(&u.date())),
            has_gantt: project.has_gantt(),
            has_timeline: project.has_timeline(),
        }
    }

    /// Card for a blog post or a single project record
    fn post_card(&self, record: &ContentRecord, mode: UrlMode) -> PostCard {
        let href = match (record.kind, self.site.project_of(record)) {
            (ContentKind::Project, Some(project)) if project.index_post.slug == record.slug => {
                build_url(Page::Project(&project.slug), mode)
            }
            (ContentKind::Project, Some(project)) => format!(
                "{}#{}",
                build_url(Page::Project(&project.slug), mode),
                update_anchor(&record.slug)
            ),
            _ => build_url(Page::BlogPost(&record.slug), mode),
        };

        PostCard {
            kind: record.kind.label(),
            title: html_escape(record.title()),
            href,
            date: iso_date(&record.date()),
            description: html_escape(record.front_matter.description.as_deref().unwrap_or_default()),
            body_html: record.html.clone(),
            tags: self.tag_links(record, mode),
            featured: record.front_matter.featured,
            update_count: 0,
            latest_update: None,
            has_gantt: false,
            has_timeline: false,
        }
    }
}

/// In-page anchor of a project update
pub fn update_anchor(slug: &str) -> String {
    format!("update-{}", slug)
}

/// Contact entry from config; `email` becomes a mailto link
fn contact_link(label: &str, target: &str) -> ContactLink {
    let href = if label.eq_ignore_ascii_case("email") && !target.starts_with("mailto:") {
        format!("mailto:{}", target)
    } else {
        target.to_string()
    };
    let mut chars = label.chars();
    let label = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    ContactLink {
        external: href.starts_with("http"),
        label: html_escape(&label),
        href: html_escape(&href),
    }
}
