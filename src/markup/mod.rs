//! Markup transform pipeline
//!
//! A record body becomes HTML in two steps: markdown is converted once,
//! then the HTML passes through an ordered list of stages. Every stage is
//! a plain function from HTML to HTML, so the order below is the whole
//! contract between them:
//!
//! 1. `images` publishes local raster images and wraps them for responsive display
//! 2. `iframes` wraps embeds in an aspect-ratio container
//! 3. `anchors` gives headings ids and permalink anchors
//! 4. `highlight` highlights fenced code blocks
//! 5. `linked_files` copies any other linked local file
//! 6. `typography` applies smart punctuation to prose
//!
//! Stages never fail. A reference they cannot resolve is logged and left
//! as written.

mod anchors;
pub mod files;
mod highlight;
mod iframes;
mod images;
mod linked_files;
pub mod markdown;
pub mod text;
mod typography;

pub use files::{PublishError, Published, PublishedImage, StaticFiles};
pub use highlight::Highlighter;

use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

use crate::config::{MarkdownConfig, SiteConfig};
use crate::content::{ContentRecord, Document};

/// Everything a stage may consult while transforming one record
pub struct StageContext<'a> {
    /// Record id, for log messages
    pub id: &'a str,
    /// Directory holding the record's markdown file
    pub record_dir: &'a Path,
    pub files: &'a StaticFiles,
    pub markdown: &'a MarkdownConfig,
    pub highlighter: &'a Highlighter,
}

pub type StageFn = fn(String, &StageContext) -> String;

const STAGES: [(&str, StageFn); 6] = [
    ("images", images::rewrite),
    ("iframes", iframes::wrap),
    ("anchors", anchors::inject),
    ("highlight", highlight::apply),
    ("linked-files", linked_files::copy),
    ("typography", typography::smarten),
];

/// Stage names in the order they run
pub fn stage_names() -> impl Iterator<Item = &'static str> {
    STAGES.iter().map(|(name, _)| *name)
}

/// The output of the pipeline for one body
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub html: String,
    pub excerpt: String,
    pub time_to_read: usize,
}

/// Renders record bodies. Built once per build and shared across threads.
pub struct MarkupPipeline {
    markdown: MarkdownConfig,
    highlighter: Highlighter,
}

impl MarkupPipeline {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            markdown: config.markdown.clone(),
            highlighter: Highlighter::new(&config.highlight),
        }
    }

    /// Run markdown conversion and every stage over `raw_body`
    pub fn render(&self, id: &str, record_dir: &Path, raw_body: &str, files: &StaticFiles) -> Rendered {
        let ctx = StageContext {
            id,
            record_dir,
            files,
            markdown: &self.markdown,
            highlighter: &self.highlighter,
        };

        let mut html = markdown::render(raw_body);
        for (name, stage) in STAGES.iter() {
            tracing::trace!("[{}] running stage {}", id, name);
            html = stage(html, &ctx);
        }

        let plain = text::plain_text(&html);
        let words = text::count_words(&plain);
        Rendered {
            excerpt: text::excerpt(&plain, self.markdown.excerpt_length),
            time_to_read: text::time_to_read(words, self.markdown.words_per_minute),
            html,
        }
    }

    /// Render a record into a [`Document`], publishing its cover and
    /// social images along the way
    pub fn render_document(&self, record: ContentRecord, files: &StaticFiles) -> Document {
        let record_dir = record
            .source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let rendered = self.render(&record.id, &record_dir, &record.raw_body, files);

        let cover_image_url = publish_front_matter_file(
            &record.id,
            "coverImage",
            &record_dir,
            record.cover_image.as_deref(),
            files,
        );
        let og_image_url = publish_front_matter_file(
            &record.id,
            "blogOgImage",
            &record_dir,
            record.blog_og_image.as_deref(),
            files,
        );

        Document {
            record,
            html: rendered.html,
            excerpt: rendered.excerpt,
            time_to_read: rendered.time_to_read,
            cover_image_url,
            og_image_url,
        }
    }
}

fn publish_front_matter_file(
    id: &str,
    field: &str,
    record_dir: &Path,
    reference: Option<&str>,
    files: &StaticFiles,
) -> Option<String> {
    let reference = reference?;
    let Some(path) = local_target(record_dir, reference) else {
        // Already a URL
        return Some(reference.to_string());
    };
    match files.publish(&path) {
        Ok(published) => Some(published.url),
        Err(e) => {
            tracing::warn!("[{}] {} {:?} not published: {}", id, field, path, e);
            None
        }
    }
}

/// Resolve a reference found in content to a file next to the record.
///
/// Returns `None` for anything that is not a relative path: URLs with a
/// scheme, protocol-relative and site-absolute paths, and fragment-only
/// links. Query strings and fragments are dropped and percent-escapes are
/// decoded.
pub fn local_target(record_dir: &Path, reference: &str) -> Option<PathBuf> {
    let reference = reference.trim();
    if reference.is_empty() || reference.starts_with('/') || reference.starts_with('#') {
        return None;
    }
    if has_scheme(reference) {
        return None;
    }

    let path = reference
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or(reference);
    if path.is_empty() {
        return None;
    }
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    Some(record_dir.join(decoded.as_ref()))
}

fn has_scheme(reference: &str) -> bool {
    match reference.find(':') {
        Some(pos) => {
            let scheme = &reference[..pos];
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
                && !reference[..pos].contains('/')
        }
        None => false,
    }
}
