//! Build errors
//!
//! Everything in here aborts the whole build. Per-record problems that
//! only degrade a single page (missing linked files, unknown highlight
//! languages) are logged with `tracing::warn!` and never become a
//! `BuildError`.

use std::path::PathBuf;

/// A fatal, build-aborting error
#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("record '{id}': missing required front-matter field '{field}'")]
    MissingRequiredField { id: String, field: &'static str },

    #[error("record '{id}': 'canonical' is set but 'canonicalName' is missing")]
    MissingCanonicalName { id: String },

    #[error("record '{id}': invalid front-matter: {message}")]
    InvalidFrontMatter { id: String, message: String },

    #[error("record '{id}': unrecognised date '{value}'")]
    InvalidDate { id: String, value: String },

    #[error("duplicate slug '{slug}' (claimed by '{first}' and '{second}')")]
    DuplicateSlug {
        slug: String,
        first: String,
        second: String,
    },

    #[error("record '{id}': feed entry is missing '{field}'")]
    FeedFieldMissing { id: String, field: &'static str },

    #[error("required collection '{name}' not found at {path:?}")]
    MissingCollection { name: String, path: PathBuf },

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BuildError>;
