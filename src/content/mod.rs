//! Content module - loads records, derives fields and holds the record types

pub mod derive;
mod frontmatter;
pub mod loader;
mod record;

pub use frontmatter::{parse_date, FrontMatter};
pub use record::{AssetFile, Canonical, Collection, ContentRecord, Document, RawRecord};
