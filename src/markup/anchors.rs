//! Heading ids and permalink anchors

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashSet;

use super::text::{decode_entities, strip_html};
use super::StageContext;

lazy_static! {
    static ref HEADING_RE: Regex =
        Regex::new(r#"(?s)<h([1-6])((?:\s[^>]*)?)>(.*?)</h([1-6])>"#).unwrap();
    static ref ID_RE: Regex = Regex::new(r#"\bid="([^"]*)""#).unwrap();
}

const FALLBACK_ID: &str = "section";

const LINK_ICON: &str = r#"<svg aria-hidden="true" focusable="false" height="16" version="1.1" viewBox="0 0 16 16" width="16"><path fill-rule="evenodd" d="M4 9h1v1H4c-1.5 0-3-1.69-3-3.5S2.55 3 4 3h4c1.45 0 3 1.69 3 3.5 0 1.41-.91 2.72-2 3.25V8.59c.58-.45 1-1.27 1-2.09C10 5.22 8.98 4 8 4H4c-.98 0-2 1.22-2 2.5S3 9 4 9zm9-3h-1v1h1c1 0 2 1.22 2 2.5S13.98 12 13 12H9c-.98 0-2-1.22-2-2.5 0-.83.42-1.64 1-2.09V6.25c-1.09.53-2 1.84-2 3.25C6 11.31 7.55 13 9 13h4c1.45 0 3-1.69 3-3.5S14.5 6 13 6z"></path></svg>"#;

/// Give every heading an id derived from its text and a visually hidden
/// permalink anchor. Ids are unique within the document: repeats get a
/// numeric suffix (`intro`, `intro-1`, ...). Headings that already carry
/// an id keep it, and generated ids never take one of theirs. Headings
/// with no sluggable text get `section`.
pub fn inject(html: String, ctx: &StageContext) -> String {
    let mut used: HashSet<String> = HEADING_RE
        .captures_iter(&html)
        .filter(|caps| caps[1] == caps[4])
        .filter_map(|caps| ID_RE.captures(&caps[2]).map(|id| id[1].to_string()))
        .collect();
    let class = &ctx.markdown.header_link_class;

    HEADING_RE
        .replace_all(&html, |caps: &Captures| {
            let level = &caps[1];
            if level != &caps[4] {
                return caps[0].to_string();
            }
            let attrs = &caps[2];
            let inner = &caps[3];
            let text = decode_entities(&strip_html(inner));

            let (id, attrs) = match ID_RE.captures(attrs) {
                Some(existing) => (existing[1].to_string(), attrs.to_string()),
                None => {
                    let mut base = heading_slug(&text);
                    if base.is_empty() {
                        base = FALLBACK_ID.to_string();
                    }
                    let id = unique(&base, &mut used);
                    (id.clone(), format!(r#" id="{}"{}"#, id, attrs))
                }
            };

            format!(
                r##"<h{level}{attrs} style="position:relative;"><a href="#{id}" aria-label="{label} permalink" class="{class} before">{icon}</a>{inner}</h{level}>"##,
                level = level,
                attrs = attrs,
                id = id,
                label = super::text::escape_html(&text.to_lowercase()),
                class = class,
                icon = LINK_ICON,
                inner = inner,
            )
        })
        .into_owned()
}

/// GitHub-style heading slug: lower-cased, punctuation dropped, runs of
/// whitespace turned into hyphens.
pub fn heading_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().to_lowercase().chars() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            slug.push(c);
        } else if c.is_whitespace() {
            slug.push('-');
        }
    }
    slug
}

fn unique(base: &str, used: &mut HashSet<String>) -> String {
    let mut id = base.to_string();
    let mut suffix = 1;
    while used.contains(&id) {
        id = format!("{}-{}", base, suffix);
        suffix += 1;
    }
    used.insert(id.clone());
    id
}
