//! URL helper functions
//!
//! Every link in the site goes through [`build_url`], so the dev server and
//! the static build agree on page locations. The only difference between the
//! two is the [`UrlMode`]: the server uses absolute, extension-less URLs while
//! the static build emits relative `.html` links that work from any
//! directory depth.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::path::PathBuf;

use crate::content::tag_key;

/// Characters escaped by JavaScript's `encodeURIComponent`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A logical page of the site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page<'a> {
    Home,
    About,
    ProjectsIndex,
    BlogIndex,
    TagsIndex,
    NotFound,
    Project(&'a str),
    BlogPost(&'a str),
    Tag(&'a str),
}

impl<'a> Page<'a> {
    /// Directory depth of the page's static file below the output root
    pub fn depth(&self) -> usize {
        match self {
            Page::Project(_) | Page::BlogPost(_) | Page::Tag(_) => 1,
            _ => 0,
        }
    }

    /// URL path without leading slash or extension, segments encoded
    fn path(&self) -> String {
        match self {
            Page::Home => String::new(),
            Page::About => "about".to_string(),
            Page::ProjectsIndex => "posts".to_string(),
            Page::BlogIndex => "blog".to_string(),
            Page::TagsIndex => "tags".to_string(),
            Page::NotFound => "404".to_string(),
            Page::Project(slug) => format!("projects/{}", encode_segment(slug)),
            Page::BlogPost(slug) => format!("articles/{}", encode_segment(slug)),
            Page::Tag(name) => format!("topics/{}", tag_segment(name)),
        }
    }
}

/// How links are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlMode {
    /// `/about` instead of `about`
    pub absolute_paths: bool,
    /// Append `.html` to page links
    pub html_extension: bool,
    /// Depth of the emitting page, for relative links
    pub depth: usize,
}

impl UrlMode {
    /// Dev server: clean absolute URLs
    pub const LIVE: UrlMode = UrlMode {
        absolute_paths: true,
        html_extension: false,
        depth: 0,
    };

    /// Static build, relative links from a page `depth` directories deep
    pub const fn static_at(depth: usize) -> UrlMode {
        UrlMode {
            absolute_paths: false,
            html_extension: true,
            depth,
        }
    }

    /// Static build with root-absolute links; for pages served from
    /// arbitrary paths such as `404.html`
    pub const fn static_absolute() -> UrlMode {
        UrlMode {
            absolute_paths: true,
            html_extension: true,
            depth: 0,
        }
    }

    /// The mode to use while rendering `page`
    pub fn for_page(self, page: &Page<'_>) -> UrlMode {
        if self.absolute_paths {
            self
        } else {
            UrlMode {
                depth: page.depth(),
                ..self
            }
        }
    }

    fn prefix(&self) -> String {
        if self.absolute_paths {
            "/".to_string()
        } else {
            "../".repeat(self.depth)
        }
    }
}

/// Href of `page` as seen from a page rendered with `mode`
pub fn build_url(page: Page<'_>, mode: UrlMode) -> String {
    let path = page.path();
    let prefix = mode.prefix();

    if path.is_empty() {
        return match (mode.absolute_paths, mode.html_extension) {
            (true, false) => prefix,
            (_, true) => format!("{}index.html", prefix),
            (false, false) if prefix.is_empty() => "./".to_string(),
            (false, false) => prefix,
        };
    }

    if mode.html_extension {
        format!("{}{}.html", prefix, path)
    } else {
        format!("{}{}", prefix, path)
    }
}

/// Href of a static asset (`styles/main.css`, `static/js/gallery.js`)
pub fn asset_url(path: &str, mode: UrlMode) -> String {
    format!("{}{}", mode.prefix(), path.trim_start_matches('/'))
}

/// Location of `page` in the static output tree
pub fn output_path(page: Page<'_>) -> PathBuf {
    match page {
        Page::Home => PathBuf::from("index.html"),
        Page::About => PathBuf::from("about.html"),
        Page::ProjectsIndex => PathBuf::from("posts.html"),
        Page::BlogIndex => PathBuf::from("blog.html"),
        Page::TagsIndex => PathBuf::from("tags.html"),
        Page::NotFound => PathBuf::from("404.html"),
        Page::Project(slug) => PathBuf::from("projects").join(format!("{}.html", slug)),
        Page::BlogPost(slug) => PathBuf::from("articles").join(format!("{}.html", slug)),
        Page::Tag(name) => PathBuf::from("topics").join(format!("{}.html", tag_key(name))),
    }
}

/// Older location of an entity page, kept so existing links keep working
pub fn legacy_output_path(page: Page<'_>) -> Option<PathBuf> {
    match page {
        Page::Project(slug) => Some(PathBuf::from("posts").join(format!("{}.html", slug))),
        Page::BlogPost(slug) => Some(PathBuf::from("blog").join(format!("{}.html", slug))),
        Page::Tag(name) => Some(PathBuf::from("tags").join(format!("{}.html", tag_key(name)))),
        _ => None,
    }
}

/// Lower-cased, percent-encoded tag for use in a URL
pub fn tag_segment(name: &str) -> String {
    encode_segment(&tag_key(name))
}

/// Percent-encode a single path segment like `encodeURIComponent`
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, COMPONENT).to_string()
}
