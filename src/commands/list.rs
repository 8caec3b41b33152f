//! List site content

use anyhow::{bail, Result};
use std::fmt::Write as _;

use crate::content::BuildMode;
use crate::helpers::iso_date;
use crate::site::Site;
use crate::Folio;

/// Print the aggregated snapshot for one content type
pub fn run(folio: &Folio, content_type: &str) -> Result<()> {
    let site = folio.load_site(BuildMode::Dev)?;
    print!("{}", render(&site, content_type)?);
    Ok(())
}

/// The listing as text
pub fn render(site: &Site, content_type: &str) -> Result<String> {
    let mut out = String::new();

    match content_type {
        "project" | "projects" => {
            writeln!(out, "Projects ({}):", site.projects().len())?;
            for project in site.projects() {
                let marker = if project.index_post.front_matter.featured {
                    " *"
                } else {
                    ""
                };
                writeln!(
                    out,
                    "  {} - {} [{}] ({} updates){}",
                    iso_date(&project.date()),
                    project.title(),
                    project.slug,
                    project.updates.len(),
                    marker
                )?;
            }
        }
        "blog" | "posts" => {
            writeln!(out, "Blog posts ({}):", site.blog_posts().len())?;
            for post in site.blog_posts() {
                writeln!(
                    out,
                    "  {} - {} [{}]",
                    iso_date(&post.date()),
                    post.title(),
                    post.source.display()
                )?;
            }
        }
        "update" | "updates" => {
            let updates = site.all_updates();
            writeln!(out, "Updates ({}):", updates.len())?;
            for update in updates {
                writeln!(
                    out,
                    "  {} - {} [{}]",
                    iso_date(&update.date()),
                    update.title(),
                    update.group_key.as_deref().unwrap_or_default()
                )?;
            }
        }
        "tag" | "tags" => {
            let tags = site.all_tags();
            writeln!(out, "Tags ({}):", tags.len())?;
            for tag in tags {
                writeln!(out, "  {} ({})", tag.name, tag.count)?;
            }
        }
        _ => {
            bail!(
                "Unknown type: {}. Available: projects, blog, updates, tags",
                content_type
            );
        }
    }

    Ok(out)
}
