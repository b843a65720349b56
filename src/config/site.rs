//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: AuthorConfig,
    pub social: SocialConfig,

    // URL
    pub url: String,

    // Directory
    pub source_dir: String,
    pub public_dir: String,
    pub tag_dir: String,
    pub newsletter_dir: String,
    pub static_dir: String,

    pub collections: CollectionsConfig,
    pub markdown: MarkdownConfig,
    pub highlight: HighlightConfig,
    pub feed: FeedConfig,
    pub sitemap: SitemapConfig,

    /// Upper bound for the per-record worker pool
    pub threads: Option<usize>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Pragmatic Pineapple".to_string(),
            description: String::new(),
            author: AuthorConfig::default(),
            social: SocialConfig::default(),

            url: "http://example.com".to_string(),

            source_dir: "content".to_string(),
            public_dir: "public".to_string(),
            tag_dir: "tags".to_string(),
            newsletter_dir: "newsletter".to_string(),
            static_dir: "static".to_string(),

            collections: CollectionsConfig::default(),
            markdown: MarkdownConfig::default(),
            highlight: HighlightConfig::default(),
            feed: FeedConfig::default(),
            sitemap: SitemapConfig::default(),

            threads: None,
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorConfig {
    pub name: String,
    pub summary: String,
    pub landing_page: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    pub twitter: Option<String>,
}

/// Where a collection lives under `source_dir` and whether it must exist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub path: String,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionsConfig {
    pub blog: CollectionConfig,
    pub newsletter: CollectionConfig,
    pub assets: CollectionConfig,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            blog: CollectionConfig {
                path: "blog".to_string(),
                required: true,
            },
            newsletter: CollectionConfig {
                path: "newsletter".to_string(),
                required: false,
            },
            assets: CollectionConfig {
                path: "assets".to_string(),
                required: false,
            },
        }
    }
}

/// Markup transform settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    pub image_max_width: u32,
    pub iframe_wrapper_style: String,
    pub header_link_class: String,
    pub excerpt_length: usize,
    pub words_per_minute: usize,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            image_max_width: 590,
            iframe_wrapper_style: "margin-bottom: 1.0725rem".to_string(),
            header_link_class: "markdown-header-link".to_string(),
            excerpt_length: 160,
            words_per_minute: 265,
        }
    }
}

/// Syntax highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "InspiredGitHub".to_string(),
        }
    }
}

/// RSS feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub output: String,
    pub limit: usize,
    pub title: Option<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            output: "rss.xml".to_string(),
            limit: 1000,
            title: None,
        }
    }
}

/// Sitemap configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    pub output: String,
    /// Paths strictly under any of these prefixes are left out
    pub exclude: Vec<String>,
    pub transactional_pages: Vec<String>,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            output: "sitemap.xml".to_string(),
            exclude: vec!["/newsletter/".to_string()],
            transactional_pages: vec![
                "/thank-you/".to_string(),
                "/confirm-subscription/".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.markdown.image_max_width, 590);
        assert_eq!(config.feed.limit, 1000);
        assert_eq!(config.feed.output, "rss.xml");
        assert!(config.collections.blog.required);
        assert!(!config.collections.newsletter.required);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
url: https://pragmaticpineapple.com/
author:
  name: Test User
feed:
  limit: 20
sitemap:
  transactional_pages:
    - /thanks/
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.author.name, "Test User");
        assert_eq!(config.feed.limit, 20);
        assert_eq!(config.feed.output, "rss.xml");
        assert_eq!(config.sitemap.transactional_pages, vec!["/thanks/"]);
        assert_eq!(config.sitemap.exclude, vec!["/newsletter/"]);
        assert_eq!(config.base_url(), "https://pragmaticpineapple.com");
    }
}
