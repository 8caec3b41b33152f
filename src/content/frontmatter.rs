//! Front-matter parsing and validation
//!
//! Files carry a loosely typed YAML header. It is read into [`RawFrontMatter`]
//! and then validated into [`FrontMatter`], so everything downstream works on
//! typed, checked values.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use super::error::FrontMatterError;

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Front-matter exactly as written in the file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFrontMatter {
    title: Option<String>,
    date: Option<String>,
    description: Option<String>,
    #[serde(deserialize_with = "string_or_vec")]
    tags: Vec<String>,
    featured: bool,
    #[serde(rename = "isIndex", alias = "is_index")]
    is_index: bool,
    #[serde(rename = "projectSlug", alias = "projectGroupKey", alias = "project_slug")]
    project_slug: Option<String>,
    #[serde(alias = "ganttTasks")]
    gantt: serde_yaml::Value,
    #[serde(alias = "timelineEvents")]
    timeline: Vec<RawTimelineEvent>,

    #[serde(flatten)]
    extra: HashMap<String, serde_yaml::Value>,
}

#[derive(Debug, Deserialize)]
struct RawGanttTask {
    name: String,
    start: String,
    end: String,
    progress: Option<f64>,
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTimelineEvent {
    title: String,
    date: String,
    link: Option<String>,
}

/// One bar of a project's Gantt chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GanttTask {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// One milestone in a project's timeline sidebar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEvent {
    pub title: String,
    pub date: NaiveDate,
    pub link: Option<String>,
}

/// Validated front-matter of a content file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontMatter {
    pub title: String,
    pub date: NaiveDateTime,
    pub description: Option<String>,
    /// Trimmed, non-empty, unique ignoring case (first spelling kept)
    pub tags: Vec<String>,
    pub featured: bool,
    pub is_index: bool,
    /// Explicit project group key
    pub project_slug: Option<String>,
    /// `Some(vec![])` when the chart is switched on without tasks
    pub gantt: Option<Vec<GanttTask>>,
    pub timeline: Vec<TimelineEvent>,
}

impl FrontMatter {
    /// Split a file into its raw front-matter block and the body that follows
    pub fn split(content: &str) -> Result<(&str, &str), FrontMatterError> {
        let content = content.trim_start_matches('\u{feff}').trim_start();

        let mut lines = content.split_inclusive('\n');
        let first = lines.next().ok_or(FrontMatterError::Missing)?;
        if first.trim_end() != "---" {
            return Err(FrontMatterError::Missing);
        }

        let header_start = first.len();
        let mut offset = header_start;
        for line in lines {
            if line.trim_end() == "---" {
                let header = &content[header_start..offset];
                let body = &content[offset + line.len()..];
                return Ok((header, body.trim_start_matches(['\n', '\r'])));
            }
            offset += line.len();
        }

        Err(FrontMatterError::Unterminated)
    }

    /// Parse and validate front-matter from content string.
    /// Returns (front_matter, body)
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let (header, body) = Self::split(content)?;

        let raw = if header.trim().is_empty() {
            RawFrontMatter::default()
        } else {
            serde_yaml::from_str::<RawFrontMatter>(header)?
        };

        Ok((raw.validate()?, body))
    }
}

impl RawFrontMatter {
    fn validate(self) -> Result<FrontMatter, FrontMatterError> {
        let title = non_empty(self.title).ok_or(FrontMatterError::MissingField("title"))?;

        let date_raw = non_empty(self.date).ok_or(FrontMatterError::MissingField("date"))?;
        let date = parse_date_string(&date_raw).ok_or_else(|| FrontMatterError::InvalidDate {
            field: "date".to_string(),
            value: date_raw.clone(),
        })?;

        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in self.tags {
            let tag = tag.trim();
            if tag.is_empty() {
                continue;
            }
            if has_separator(tag) {
                return Err(FrontMatterError::InvalidField {
                    field: "tags".to_string(),
                    message: format!("tag `{}` contains a path separator", tag),
                });
            }
            let key = tag.to_lowercase();
            if !tags.iter().any(|t| t.to_lowercase() == key) {
                tags.push(tag.to_string());
            }
        }

        let gantt = validate_gantt(self.gantt)?;

        let timeline = self
            .timeline
            .into_iter()
            .enumerate()
            .map(|(i, event)| {
                let date = parse_date_string(&event.date)
                    .ok_or_else(|| FrontMatterError::InvalidDate {
                        field: format!("timeline[{}].date", i),
                        value: event.date.clone(),
                    })?
                    .date();
                Ok(TimelineEvent {
                    title: event.title,
                    date,
                    link: non_empty(event.link),
                })
            })
            .collect::<Result<Vec<_>, FrontMatterError>>()?;

        let project_slug = non_empty(self.project_slug);
        if let Some(slug) = &project_slug {
            if has_separator(slug) || slug == "." || slug == ".." {
                return Err(FrontMatterError::InvalidField {
                    field: "projectSlug".to_string(),
                    message: format!("`{}` is not a single path segment", slug),
                });
            }
        }

        for key in self.extra.keys() {
            tracing::debug!("Ignoring unknown front-matter key `{}`", key);
        }

        Ok(FrontMatter {
            title,
            date,
            description: non_empty(self.description),
            tags,
            featured: self.featured,
            is_index: self.is_index,
            project_slug,
            gantt,
            timeline,
        })
    }
}

/// `gantt` is either a switch or the list of tasks
fn validate_gantt(value: serde_yaml::Value) -> Result<Option<Vec<GanttTask>>, FrontMatterError> {
    match value {
        serde_yaml::Value::Null | serde_yaml::Value::Bool(false) => Ok(None),
        serde_yaml::Value::Bool(true) => Ok(Some(Vec::new())),
        value @ serde_yaml::Value::Sequence(_) => {
            let raw: Vec<RawGanttTask> = serde_yaml::from_value(value)?;
            raw.into_iter()
                .enumerate()
                .map(|(i, task)| validate_gantt_task(i, task))
                .collect::<Result<Vec<_>, _>>()
                .map(Some)
        }
        _ => Err(FrontMatterError::InvalidField {
            field: "gantt".to_string(),
            message: "expected a boolean or a list of tasks".to_string(),
        }),
    }
}

fn validate_gantt_task(i: usize, task: RawGanttTask) -> Result<GanttTask, FrontMatterError> {
    let date = |field: &str, value: &str| {
        parse_date_string(value)
            .map(|dt| dt.date())
            .ok_or_else(|| FrontMatterError::InvalidDate {
                field: format!("gantt[{}].{}", i, field),
                value: value.to_string(),
            })
    };
    let start = date("start", &task.start)?;
    let end = date("end", &task.end)?;

    if end < start {
        return Err(FrontMatterError::InvalidField {
            field: format!("gantt[{}]", i),
            message: format!("task `{}` ends before it starts", task.name),
        });
    }
    if let Some(progress) = task.progress {
        if !(0.0..=100.0).contains(&progress) {
            return Err(FrontMatterError::InvalidField {
                field: format!("gantt[{}].progress", i),
                message: format!("{} is outside 0..=100", progress),
            });
        }
    }

    Ok(GanttTask {
        name: task.name,
        start,
        end,
        progress: task.progress,
        color: non_empty(task.color),
    })
}

/// Tags and project slugs become file names in the output tree
fn has_separator(value: &str) -> bool {
    value.contains(['/', '\\'])
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a date string in various formats
pub fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    // RFC 3339 / ISO 8601 with offset: keep the wall-clock time as written
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_project_frontmatter() {
        let content = r##"---
title: Industrial PLC Communication Bridge
date: 2024-02-10
description: Custom bridge for legacy PLCs.
tags:
  - Industrial Automation
  - PLC
featured: true
isIndex: true
projectSlug: plc-communication-bridge
timeline:
  - title: Requirements Analysis
    date: 2023-12-01
    link: "#analysis"
---

Body text.
"##;

        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, "Industrial PLC Communication Bridge");
        assert_eq!(fm.date.format("%Y-%m-%d").to_string(), "2024-02-10");
        assert_eq!(fm.tags, vec!["Industrial Automation", "PLC"]);
        assert!(fm.featured);
        assert!(fm.is_index);
        assert_eq!(fm.project_slug.as_deref(), Some("plc-communication-bridge"));
        assert_eq!(fm.timeline.len(), 1);
        assert_eq!(fm.timeline[0].link.as_deref(), Some("#analysis"));
        assert_eq!(fm.gantt, None);
        assert_eq!(body.trim(), "Body text.");
    }

    #[test]
    fn test_single_string_tag_and_dedup() {
        let content = "---\ntitle: T\ndate: 2024-01-15\ntags: Rust\n---\nx";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags, vec!["Rust"]);

        let content = "---\ntitle: T\ndate: 2024-01-15\ntags: [Rust, rust, ' ', RUST, Web]\n---\nx";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags, vec!["Rust", "Web"]);
    }

    #[test]
    fn test_gantt_switch_and_tasks() {
        let content = "---\ntitle: T\ndate: 2024-01-15\ngantt: true\n---\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.gantt, Some(Vec::new()));

        let content = r##"---
title: T
date: 2024-01-15
gantt:
  - name: Design
    start: 2024-01-01
    end: 2024-01-20
    progress: 100
    color: "#4caf50"
  - name: Build
    start: 2024-01-21
    end: 2024-03-01
---
"##;
        let (fm, _) = FrontMatter::parse(content).unwrap();
        let tasks = fm.gantt.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].progress, Some(100.0));
        assert_eq!(tasks[1].color, None);
    }

    #[test]
    fn test_gantt_rejects_bad_progress() {
        let content = r#"---
title: T
date: 2024-01-15
gantt:
  - name: Design
    start: 2024-01-01
    end: 2024-01-20
    progress: 140
---
"#;
        let err = FrontMatter::parse(content).unwrap_err();
        assert!(matches!(err, FrontMatterError::InvalidField { .. }));
    }

    #[test]
    fn test_names_used_as_paths_are_single_segments() {
        for tags in ["[CI/CD]", "['../about']", "['a\\b']"] {
            let content = format!("---\ntitle: T\ndate: 2024-01-15\ntags: {}\n---\n", tags);
            let err = FrontMatter::parse(&content).unwrap_err();
            assert!(
                matches!(err, FrontMatterError::InvalidField { ref field, .. } if field == "tags"),
                "{} was accepted",
                tags
            );
        }

        for slug in ["../outside", "a/b", "..", "."] {
            let content = format!(
                "---\ntitle: T\ndate: 2024-01-15\nprojectSlug: '{}'\n---\n",
                slug
            );
            let err = FrontMatter::parse(&content).unwrap_err();
            assert!(
                matches!(err, FrontMatterError::InvalidField { ref field, .. } if field == "projectSlug"),
                "{} was accepted",
                slug
            );
        }

        let content = "---\ntitle: T\ndate: 2024-01-15\ntags: [C++, Node.js, '..']\nprojectSlug: rover\n---\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags, vec!["C++", "Node.js", ".."]);
        assert_eq!(fm.project_slug.as_deref(), Some("rover"));
    }

    #[test]
    fn test_missing_block_is_an_error() {
        let err = FrontMatter::parse("# Just markdown\n").unwrap_err();
        assert!(matches!(err, FrontMatterError::Missing));

        let err = FrontMatter::parse("---\ntitle: T\n\nno closing line").unwrap_err();
        assert!(matches!(err, FrontMatterError::Unterminated));
    }

    #[test]
    fn test_non_mapping_is_an_error() {
        let err = FrontMatter::parse("---\n- a\n- b\n---\nbody").unwrap_err();
        assert!(matches!(err, FrontMatterError::Yaml(_)));

        let err = FrontMatter::parse("---\ntitle: [unclosed\n---\nbody").unwrap_err();
        assert!(matches!(err, FrontMatterError::Yaml(_)));
    }

    #[test]
    fn test_required_fields() {
        let err = FrontMatter::parse("---\ndate: 2024-01-01\n---\n").unwrap_err();
        assert!(matches!(err, FrontMatterError::MissingField("title")));

        let err = FrontMatter::parse("---\ntitle: T\n---\n").unwrap_err();
        assert!(matches!(err, FrontMatterError::MissingField("date")));

        let err = FrontMatter::parse("---\ntitle: T\ndate: last tuesday\n---\n").unwrap_err();
        assert!(matches!(err, FrontMatterError::InvalidDate { .. }));
    }

    #[test]
    fn test_crlf_and_unknown_keys() {
        let content = "---\r\ntitle: T\r\ndate: 2024-01-15\r\nlayout: wide\r\n---\r\nBody\r\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, "T");
        assert!(body.starts_with("Body"));
    }

    #[test]
    fn test_parse_date_string_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        for s in [
            "2024-01-15",
            "2024/01/15",
            "2024-01-15 10:30:00",
            "2024-01-15T10:30:00",
            "2024-01-15T10:30:00+02:00",
        ] {
            assert_eq!(parse_date_string(s).unwrap().date(), expected, "{}", s);
        }
        assert!(parse_date_string("15th of January").is_none());
    }
}
