//! Content errors
//!
//! Every variant is fatal for a build: aggregation assumes well-formed
//! records, so a single bad file stops the run before any output is written.

use std::path::PathBuf;
use thiserror::Error;

/// Problems with a single front-matter block, independent of the file it came from
#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("missing front-matter block (the file must start with `---`)")]
    Missing,

    #[error("front-matter block is not closed by a `---` line")]
    Unterminated,

    #[error("front-matter is not a valid key-value mapping: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` has an unrecognised date `{value}`")]
    InvalidDate { field: String, value: String },

    #[error("field `{field}`: {message}")]
    InvalidField { field: String, message: String },
}

/// Errors raised while loading the content tree
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid front-matter in {path:?}: {source}")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },

    #[error("Duplicate slug `{slug}` ({first:?} and {second:?})")]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
}
