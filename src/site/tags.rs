//! Tag index

use indexmap::IndexMap;
use serde::Serialize;

use crate::content::{tag_key, ContentKind};

/// Reference to a tagged post in the aggregated site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPost {
    pub kind: ContentKind,
    /// Project slug for project posts
    pub project: Option<String>,
    pub slug: String,
}

/// Every post carrying one tag
#[derive(Debug, Clone)]
pub struct TagEntry {
    /// First-seen spelling
    pub name: String,
    pub posts: Vec<TagPost>,
}

impl TagEntry {
    pub fn count(&self) -> usize {
        self.posts.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: usize,
}

/// Case-insensitive tag index in first-seen order
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    entries: IndexMap<String, TagEntry>,
}

impl TagIndex {
    /// Record `post` under each of `tags`
    pub fn insert<'a>(&mut self, tags: impl IntoIterator<Item = &'a String>, post: TagPost) {
        for tag in tags {
            let key = tag_key(tag);
            if key.is_empty() {
                continue;
            }
            let entry = self.entries.entry(key).or_insert_with(|| TagEntry {
                name: tag.trim().to_string(),
                posts: Vec::new(),
            });
            if !entry.posts.contains(&post) {
                entry.posts.push(post.clone());
            }
        }
    }

    pub fn get(&self, tag: &str) -> Option<&TagEntry> {
        self.entries.get(&tag_key(tag))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &TagEntry> {
        self.entries.values()
    }

    /// Counts, most used first, ties by lower-cased name
    pub fn counts(&self) -> Vec<TagCount> {
        let mut sorted: Vec<(&String, &TagEntry)> = self.entries.iter().collect();
        sorted.sort_by(|(ka, a), (kb, b)| b.count().cmp(&a.count()).then_with(|| ka.cmp(kb)));
        sorted
            .into_iter()
            .map(|(_, entry)| TagCount {
                name: entry.name.clone(),
                count: entry.count(),
            })
            .collect()
    }
}
