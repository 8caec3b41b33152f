//! Shared test utilities: in-memory record builders so aggregation, query
//! and rendering tests do not need a content tree on disk.

use chrono::{NaiveDate, NaiveDateTime};
use std::path::PathBuf;

use crate::content::{ContentKind, ContentRecord, FrontMatter};

/// Midnight of a `YYYY-MM-DD` date
pub fn date(s: &str) -> NaiveDateTime {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn front_matter(title: &str, day: &str) -> FrontMatter {
    FrontMatter {
        title: title.to_string(),
        date: date(day),
        description: None,
        tags: Vec::new(),
        featured: false,
        is_index: false,
        project_slug: None,
        gantt: None,
        timeline: Vec::new(),
    }
}

/// A project record in group `group`
pub fn project_post(group: &str, slug: &str, day: &str, is_index: bool) -> ContentRecord {
    let mut fm = front_matter(&format!("{} {}", group, slug), day);
    fm.is_index = is_index;
    ContentRecord {
        slug: slug.to_string(),
        kind: ContentKind::Project,
        front_matter: fm,
        group_key: Some(group.to_string()),
        raw_body: format!("Body of {}", slug),
        html: format!("<p>Body of {}</p>\n", slug),
        source: PathBuf::from(format!("projects/{}/{}.md", group, slug)),
    }
}

pub fn blog_post(slug: &str, day: &str) -> ContentRecord {
    ContentRecord {
        slug: slug.to_string(),
        kind: ContentKind::Blog,
        front_matter: front_matter(&format!("Post {}", slug), day),
        group_key: None,
        raw_body: format!("Body of {}", slug),
        html: format!("<p>Body of {}</p>\n", slug),
        source: PathBuf::from(format!("blog/{}.md", slug)),
    }
}

/// Set tags on a record
pub fn tagged(mut record: ContentRecord, tags: &[&str]) -> ContentRecord {
    record.front_matter.tags = tags.iter().map(|t| t.to_string()).collect();
    record
}

pub fn slugs(records: &[ContentRecord]) -> Vec<&str> {
    records.iter().map(|r| r.slug.as_str()).collect()
}

/// A small site: two projects (one with updates) and three blog posts
pub fn sample_records() -> Vec<ContentRecord> {
    vec![
        tagged(
            project_post("weather-station", "index", "2024-01-10", true),
            &["IoT", "Rust"],
        ),
        tagged(
            project_post("weather-station", "sensors", "2024-02-01", false),
            &["iot"],
        ),
        tagged(
            project_post("weather-station", "dashboard", "2024-03-01", false),
            &["Web Development"],
        ),
        tagged(
            project_post("plc-bridge", "index", "2023-11-01", true),
            &["PLC"],
        ),
        tagged(blog_post("welcome", "2024-01-05"), &["Intro", "rust"]),
        tagged(blog_post("async-notes", "2024-02-20"), &["RUST", "web development"]),
        blog_post("untagged", "2023-12-24"),
    ]
}
