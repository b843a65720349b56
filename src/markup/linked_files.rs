//! Copy files linked from content and point links at the copies

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::path::Path;

use super::text::{segments, tag_name, Segment};
use super::{local_target, StageContext};

lazy_static! {
    static ref LINK_ATTR_RE: Regex = Regex::new(r#"(\s(?:href|src)=")([^"]*)(")"#).unwrap();
}

const LINKING_ELEMENTS: [&str; 6] = ["a", "img", "video", "audio", "source", "track"];

/// Links to other pages, not files
const PAGE_EXTENSIONS: [&str; 4] = ["md", "markdown", "html", "htm"];

/// Publish every local file referenced by `href` or `src` and rewrite the
/// reference to the published URL. References to missing files are kept
/// as written and reported.
pub fn copy(html: String, ctx: &StageContext) -> String {
    let mut out = String::with_capacity(html.len());

    for segment in segments(&html) {
        match segment {
            Segment::Tag(tag) if is_linking(tag) => {
                let rewritten = LINK_ATTR_RE.replace_all(tag, |caps: &Captures| {
                    match published_url(&caps[2], ctx) {
                        Some(url) => format!("{}{}{}", &caps[1], url, &caps[3]),
                        None => caps[0].to_string(),
                    }
                });
                out.push_str(&rewritten);
            }
            Segment::Tag(tag) | Segment::Text(tag) => out.push_str(tag),
        }
    }
    out
}

fn is_linking(tag: &str) -> bool {
    matches!(tag_name(tag), Some((name, false)) if LINKING_ELEMENTS.contains(&name.as_str()))
}

fn published_url(reference: &str, ctx: &StageContext) -> Option<String> {
    let path = local_target(ctx.record_dir, reference)?;
    if !is_file_reference(&path) {
        return None;
    }
    if !path.is_file() {
        tracing::warn!("[{}] linked file not found: {}", ctx.id, reference);
        return None;
    }

    match ctx.files.publish(&path) {
        Ok(published) => Some(published.url),
        Err(e) => {
            tracing::warn!("[{}] could not copy {:?}: {}", ctx.id, path, e);
            None
        }
    }
}

fn is_file_reference(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => !PAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}
