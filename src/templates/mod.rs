//! Built-in page templates using the Tera template engine
//!
//! All templates are embedded in the binary. The dev server and the static
//! build render through the same [`Pages`] renderer; only the
//! [`UrlMode`](crate::helpers::UrlMode) differs.

mod data;
mod pages;

use anyhow::Result;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::helpers::{format_date, full_date, strip_html, truncate};

pub use data::*;
pub use pages::{NotFound, Pages};

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // View models are escaped when built; bodies are already HTML
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("home.html", include_str!("site/home.html")),
            ("projects.html", include_str!("site/projects.html")),
            ("project.html", include_str!("site/project.html")),
            ("blog.html", include_str!("site/blog.html")),
            ("article.html", include_str!("site/article.html")),
            ("tags.html", include_str!("site/tags.html")),
            ("tag.html", include_str!("site/tag.html")),
            ("about.html", include_str!("site/about.html")),
            ("not_found.html", include_str!("site/not_found.html")),
            ("partials/card.html", include_str!("site/partials/card.html")),
            ("partials/tags.html", include_str!("site/partials/tags.html")),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);
        tera.register_filter("pluralize", pluralize_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(strip_html(&s)))
}

/// Tera filter: truncate by character count, collapsing whitespace
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 160,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    Ok(tera::Value::String(truncate(
        &collapsed,
        length,
        Some(&omission),
    )))
}

/// Tera filter: format a `YYYY-MM-DD` date. `LL` gives "January 5, 2024";
/// anything else is a Moment-style pattern.
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "LL".to_string(),
    };

    let Some(datetime) = chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return Ok(tera::Value::String(s));
    };

    let formatted = if format == "LL" {
        full_date(&datetime)
    } else {
        format_date(&datetime, &format)
    };
    Ok(tera::Value::String(formatted))
}

/// Tera filter: `3 | pluralize(word="post")` -> "3 posts"
fn pluralize_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let n = tera::try_get_value!("pluralize", "value", u64, value);
    let word = match args.get("word") {
        Some(val) => tera::try_get_value!("pluralize", "word", String, val),
        None => "item".to_string(),
    };
    let suffix = if n == 1 { "" } else { "s" };
    Ok(tera::Value::String(format!("{} {}{}", n, word, suffix)))
}
