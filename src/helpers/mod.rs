//! Small formatting helpers shared by pages, the feed and the sitemap

mod date;
mod url;

pub use date::*;
pub use url::*;
