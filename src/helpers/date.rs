//! Date helper functions

use chrono::{DateTime, Utc};

/// Date as shown on pages, like "January 05, 2024"
pub fn display_date(date: &DateTime<Utc>) -> String {
    date.format("%B %d, %Y").to_string()
}

/// RFC 2822 date for RSS `pubDate` and `lastBuildDate`
pub fn rfc2822(date: &DateTime<Utc>) -> String {
    date.to_rfc2822()
}

/// ISO 8601 date for `<time datetime>` and sitemap `lastmod`
pub fn date_xml(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
