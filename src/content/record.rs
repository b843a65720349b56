//! Content records: raw as loaded, derived, and rendered

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use super::FrontMatter;

/// A named grouping of content sharing a template and lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Collection {
    Post,
    NewsletterIssue,
    Asset,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Post => "post",
            Collection::NewsletterIssue => "newsletter-issue",
            Collection::Asset => "asset",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A markdown record as read from disk. Never mutated after load.
#[derive(Debug, Clone)]
pub struct RawRecord {
    /// Stable identifier, unique within the collection
    pub id: String,
    pub collection: Collection,
    /// Full path of the markdown file
    pub source: PathBuf,
    pub raw_body: String,
    pub front_matter: FrontMatter,
    /// Position in the overall load order (date tie-break)
    pub order: usize,
}

/// A record that was published elsewhere first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Canonical {
    pub url: String,
    pub name: String,
}

/// A validated record carrying typed front-matter and its slug
#[derive(Debug, Clone)]
pub struct ContentRecord {
    pub id: String,
    pub collection: Collection,
    pub source: PathBuf,
    pub raw_body: String,
    pub order: usize,

    pub title: String,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    /// Defaults to `true`
    pub published: bool,
    /// Defaults to `false`
    pub newsletter: bool,
    pub canonical: Option<Canonical>,
    /// Display casing as authored
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    pub blog_og_image: Option<String>,

    /// Site-wide unique URL path, e.g. `/my-post/`
    pub slug: String,
}

impl AsRef<ContentRecord> for ContentRecord {
    fn as_ref(&self) -> &ContentRecord {
        self
    }
}

/// A record after the markup transform pipeline
#[derive(Debug, Clone)]
pub struct Document {
    pub record: ContentRecord,
    pub html: String,
    /// Plain text, at most `excerpt_length` characters
    pub excerpt: String,
    /// Whole minutes, never zero
    pub time_to_read: usize,
    pub cover_image_url: Option<String>,
    pub og_image_url: Option<String>,
}

impl AsRef<ContentRecord> for Document {
    fn as_ref(&self) -> &ContentRecord {
        &self.record
    }
}

/// A file from the asset collection, copied verbatim into the output
#[derive(Debug, Clone)]
pub struct AssetFile {
    pub source: PathBuf,
    /// Path relative to the collection root
    pub relative: PathBuf,
}

#[cfg(test)]
impl ContentRecord {
    /// A published post dated `date` (`YYYY-MM-DD`) at load position `order`
    pub(crate) fn fixture(id: &str, date: &str, order: usize) -> Self {
        Self {
            id: id.to_string(),
            collection: Collection::Post,
            source: PathBuf::from(format!("content/blog/{}/index.md", id)),
            raw_body: String::new(),
            order,
            title: id.to_string(),
            date: super::parse_date(date).unwrap(),
            description: None,
            published: true,
            newsletter: false,
            canonical: None,
            tags: Vec::new(),
            cover_image: None,
            blog_og_image: None,
            slug: format!("/{}/", id),
        }
    }
}

#[cfg(test)]
impl Document {
    pub(crate) fn fixture(record: ContentRecord, html: &str) -> Self {
        Self {
            excerpt: html.to_string(),
            html: html.to_string(),
            time_to_read: 1,
            cover_image_url: None,
            og_image_url: None,
            record,
        }
    }
}
