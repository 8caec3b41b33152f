//! Helper functions shared by the page renderer, generator and server

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
