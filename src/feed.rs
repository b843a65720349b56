//! RSS 2.0 feed of published posts

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::content::{Collection, ContentRecord, Document};
use crate::error::{BuildError, Result};
use crate::helpers::{full_url, rfc2822};

lazy_static! {
    // Site-absolute references, but not protocol-relative ones
    static ref ROOTED_URL_RE: Regex = Regex::new(r#"(\s(?:href|src)=["'])/([^/"'])"#).unwrap();
}

/// Posts only, never newsletter issues or drafts
pub fn is_eligible(record: &ContentRecord) -> bool {
    record.collection == Collection::Post && !record.newsletter && record.published
}

/// Eligible documents, newest first, at most `limit` of them.
///
/// Every eligible document is checked for the fields an entry needs, so
/// a broken record fails the build instead of silently vanishing from
/// the feed.
pub fn select(documents: &[Document], limit: usize) -> Result<Vec<&Document>> {
    let mut entries: Vec<&Document> = documents
        .iter()
        .filter(|doc| is_eligible(&doc.record))
        .collect();

    for doc in &entries {
        check_entry(doc)?;
    }

    entries.sort_by(|a, b| {
        b.record
            .date
            .cmp(&a.record.date)
            .then(a.record.order.cmp(&b.record.order))
    });
    entries.truncate(limit);
    Ok(entries)
}

fn check_entry(doc: &Document) -> Result<()> {
    let missing = |field: &'static str| BuildError::FeedFieldMissing {
        id: doc.record.id.clone(),
        field,
    };
    if doc.record.title.trim().is_empty() {
        return Err(missing("title"));
    }
    if doc.record.slug.is_empty() {
        return Err(missing("slug"));
    }
    Ok(())
}

/// Serialize `entries` (already selected and sorted) as an RSS document
pub fn render_feed(config: &SiteConfig, entries: &[&Document]) -> String {
    let title = config.feed.title.as_deref().unwrap_or(&config.title);
    let base_url = config.base_url();

    let mut feed = String::new();
    feed.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    feed.push('\n');
    feed.push_str(r#"<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/" xmlns:atom="http://www.w3.org/2005/Atom">"#);
    feed.push('\n');
    feed.push_str("  <channel>\n");
    feed.push_str(&format!("    <title>{}</title>\n", escape_xml(title)));
    feed.push_str(&format!(
        "    <description>{}</description>\n",
        escape_xml(&config.description)
    ));
    feed.push_str(&format!("    <link>{}/</link>\n", escape_xml(base_url)));
    feed.push_str(&format!(
        "    <atom:link href=\"{}\" rel=\"self\" type=\"application/rss+xml\"/>\n",
        escape_xml(&full_url(config, &config.feed.output))
    ));
    feed.push_str(&format!(
        "    <generator>{} {}</generator>\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    ));
    // Newest entry rather than the wall clock, so identical input gives
    // an identical file
    if let Some(newest) = entries.first() {
        feed.push_str(&format!(
            "    <lastBuildDate>{}</lastBuildDate>\n",
            rfc2822(&newest.record.date)
        ));
    }

    for doc in entries {
        let record = &doc.record;
        let link = full_url(config, &record.slug);
        let content = strip_invalid_xml_chars(&absolute_urls(&doc.html, base_url));

        feed.push_str("    <item>\n");
        feed.push_str(&format!(
            "      <title>{}</title>\n",
            escape_xml(&strip_invalid_xml_chars(&record.title))
        ));
        feed.push_str(&format!(
            "      <description>{}</description>\n",
            escape_xml(&strip_invalid_xml_chars(&doc.excerpt))
        ));
        feed.push_str(&format!("      <link>{}</link>\n", escape_xml(&link)));
        feed.push_str(&format!(
            "      <guid isPermaLink=\"true\">{}</guid>\n",
            escape_xml(&link)
        ));
        feed.push_str(&format!(
            "      <pubDate>{}</pubDate>\n",
            rfc2822(&record.date)
        ));
        feed.push_str(&format!(
            "      <content:encoded>{}</content:encoded>\n",
            cdata(&content)
        ));
        feed.push_str("    </item>\n");
    }

    feed.push_str("  </channel>\n");
    feed.push_str("</rss>\n");
    feed
}

/// Select, render and write the feed under `out_dir`
pub fn write_feed(config: &SiteConfig, documents: &[Document], out_dir: &Path) -> Result<PathBuf> {
    let entries = select(documents, config.feed.limit)?;
    let output_path = out_dir.join(config.feed.output.trim_start_matches('/'));
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output_path, render_feed(config, &entries))?;
    tracing::info!("Generated {} with {} entries", config.feed.output, entries.len());
    Ok(output_path)
}

/// Point site-absolute `href`/`src` references at the full site URL
fn absolute_urls(html: &str, base_url: &str) -> String {
    ROOTED_URL_RE
        .replace_all(html, |caps: &Captures| {
            format!("{}{}/{}", &caps[1], base_url, &caps[2])
        })
        .into_owned()
}

/// Wrap in CDATA, splitting any `]]>` the content itself contains
fn cdata(s: &str) -> String {
    format!("<![CDATA[{}]]>", s.replace("]]>", "]]]]><![CDATA[>"))
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// XML 1.0 only allows #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            c == '\t'
                || c == '\n'
                || c == '\r'
                || ('\u{0020}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || ('\u{10000}'..='\u{10FFFF}').contains(&c)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, date: &str, order: usize) -> Document {
        Document::fixture(ContentRecord::fixture(id, date, order), "<p>Body</p>")
    }

    fn config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.url = "https://pragmaticpineapple.com/".to_string();
        config
    }

    #[test]
    fn test_eligibility() {
        let post = ContentRecord::fixture("post", "2020-01-01", 0);
        assert!(is_eligible(&post));

        let mut newsletter = post.clone();
        newsletter.newsletter = true;
        assert!(!is_eligible(&newsletter));

        let mut draft = post.clone();
        draft.published = false;
        assert!(!is_eligible(&draft));

        let mut issue = post;
        issue.collection = Collection::NewsletterIssue;
        assert!(!is_eligible(&issue));
    }

    #[test]
    fn test_select_filters_and_sorts() {
        let mut flagged = doc("flagged", "2021-01-01", 3);
        flagged.record.newsletter = true;
        let mut draft = doc("draft", "2022-01-01", 4);
        draft.record.published = false;
        let documents = vec![
            doc("old", "2019-01-01", 0),
            doc("new", "2020-06-01", 1),
            doc("mid", "2020-01-01", 2),
            flagged,
            draft,
        ];

        let entries = select(&documents, 1000).unwrap();
        let ids: Vec<_> = entries.iter().map(|d| d.record.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
        for pair in entries.windows(2) {
            assert!(pair[0].record.date >= pair[1].record.date);
        }
    }

    #[test]
    fn test_select_caps_entries() {
        let documents: Vec<_> = (0..5)
            .map(|i| doc(&format!("p{}", i), &format!("2020-01-0{}", i + 1), i))
            .collect();
        let entries = select(&documents, 3).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].record.id, "p4");
    }

    #[test]
    fn test_missing_field_is_fatal() {
        let mut broken = doc("broken", "2020-01-01", 0);
        broken.record.title = "  ".to_string();
        let err = select(&[broken], 1000).unwrap_err();
        assert!(matches!(err, BuildError::FeedFieldMissing { field: "title", .. }));
        assert!(err.to_string().contains("broken"));

        // Not eligible, so not checked
        let mut newsletter = doc("letter", "2020-01-01", 0);
        newsletter.record.title = String::new();
        newsletter.record.newsletter = true;
        assert!(select(&[newsletter], 1000).unwrap().is_empty());
    }

    #[test]
    fn test_empty_body_is_still_an_entry() {
        let mut empty = doc("empty", "2020-02-01", 0);
        empty.html = String::new();
        empty.excerpt = String::new();
        let documents = vec![empty, doc("full", "2020-01-01", 1)];
        let entries = select(&documents, 1000).unwrap();
        assert_eq!(entries.len(), 2);

        let xml = render_feed(&config(), &entries);
        assert!(xml.contains("<link>https://pragmaticpineapple.com/empty/</link>"));
        assert!(xml.contains("<content:encoded><![CDATA[]]></content:encoded>"));
    }

    #[test]
    fn test_render_feed() {
        let mut post = doc("hello-world", "2020-05-04", 0);
        post.record.title = "Tips & Tricks".to_string();
        post.html = r#"<p><a href="/other/">x</a><img src="//cdn.example.com/a.png"> ]]> </p>"#.to_string();
        let documents = vec![post];
        let entries = select(&documents, 1000).unwrap();

        let xml = render_feed(&config(), &entries);
        assert!(xml.contains("<title>Tips &amp; Tricks</title>"));
        assert!(xml.contains("<link>https://pragmaticpineapple.com/hello-world/</link>"));
        assert!(xml.contains("<pubDate>Mon, "));
        assert!(xml.contains("May 2020 00:00:00 +0000</pubDate>"));
        assert!(xml.contains(r#"href="https://pragmaticpineapple.com/other/""#));
        assert!(xml.contains(r#"src="//cdn.example.com/a.png""#));
        assert!(xml.contains("]]]]><![CDATA[>"));
        assert!(xml.contains("<lastBuildDate>"));
    }

    #[test]
    fn test_write_feed() {
        let dir = tempfile::TempDir::new().unwrap();
        let documents = vec![doc("a", "2020-01-01", 0)];
        let path = write_feed(&config(), &documents, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("rss.xml"));
        assert!(fs::read_to_string(path).unwrap().contains("<item>"));
    }

    #[test]
    fn test_strip_invalid_xml_chars() {
        assert_eq!(strip_invalid_xml_chars("a\u{0}b\u{8}c\nd"), "abc\nd");
    }
}
