//! Content module - loading, front-matter validation and markdown rendering

mod error;
mod frontmatter;
pub mod gallery;
pub mod loader;
mod markdown;
mod record;

pub use error::{ContentError, FrontMatterError};
pub use frontmatter::{parse_date_string, FrontMatter, GanttTask, TimelineEvent};
pub use loader::{BuildMode, ContentLoader};
pub use markdown::MarkdownRenderer;
pub use record::{tag_key, ContentKind, ContentRecord};
