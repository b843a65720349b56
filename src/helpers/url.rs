//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::SiteConfig;

/// Characters escaped in one path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/');

/// Percent-encode a file name for use as the last segment of a URL
pub fn encode_path(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Absolute URL of a site path
///
/// # Examples
/// ```ignore
/// full_url(&config, "/about/") // -> "https://example.com/about/"
/// ```
pub fn full_url(config: &SiteConfig, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!("{}/{}", config.base_url(), path.trim_start_matches('/'))
}

/// Join path segments into a site path with leading and trailing slashes
///
/// # Examples
/// ```ignore
/// site_path(&["tags", "rust"]) // -> "/tags/rust/"
/// ```
pub fn site_path(segments: &[&str]) -> String {
    let joined = segments
        .iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_path() {
        assert_eq!(encode_path("my photo.png"), "my%20photo.png");
        assert_eq!(encode_path("a#b?.txt"), "a%23b%3F.txt");
        assert_eq!(encode_path("plain-name_1.jpg"), "plain-name_1.jpg");
    }

    #[test]
    fn test_full_url() {
        let mut config = SiteConfig::default();
        config.url = "https://example.com/".to_string();
        assert_eq!(full_url(&config, "/about/"), "https://example.com/about/");
        assert_eq!(full_url(&config, "/"), "https://example.com/");
        assert_eq!(
            full_url(&config, "https://cdn.example.com/x.png"),
            "https://cdn.example.com/x.png"
        );
    }

    #[test]
    fn test_site_path() {
        assert_eq!(site_path(&["tags", "rust"]), "/tags/rust/");
        assert_eq!(site_path(&["/newsletter/", "issue-1"]), "/newsletter/issue-1/");
        assert_eq!(site_path(&[]), "/");
    }
}
