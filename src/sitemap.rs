//! Sitemap of every page the build writes

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::error::Result;
use crate::helpers::full_url;

const CHANGEFREQ: &str = "daily";

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub path: String,
    pub priority: f32,
}

enum Rule {
    Root,
    Tags(String),
    Exact(Vec<String>),
}

impl Rule {
    fn matches(&self, path: &str) -> bool {
        match self {
            Rule::Root => path == "/",
            Rule::Tags(segment) => path.contains(segment.as_str()),
            Rule::Exact(paths) => paths.iter().any(|p| p == path),
        }
    }
}

/// Priority rules, evaluated in order; the first match wins
pub struct PriorityRules {
    rules: Vec<(Rule, f32)>,
    default: f32,
}

impl PriorityRules {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            rules: vec![
                (Rule::Root, 0.9),
                (Rule::Tags(format!("/{}/", config.tag_dir.trim_matches('/'))), 0.6),
                (Rule::Exact(config.sitemap.transactional_pages.clone()), 0.5),
            ],
            default: 1.0,
        }
    }

    pub fn priority(&self, path: &str) -> f32 {
        self.rules
            .iter()
            .find(|(rule, _)| rule.matches(path))
            .map(|(_, priority)| *priority)
            .unwrap_or(self.default)
    }
}

/// Whether `path` lies strictly under one of the excluded prefixes. The
/// prefix page itself is kept.
pub fn is_excluded(config: &SiteConfig, path: &str) -> bool {
    config
        .sitemap
        .exclude
        .iter()
        .any(|prefix| path.len() > prefix.len() && path.starts_with(prefix.as_str()))
}

/// Entries for `paths`, minus exclusions, sorted by path
pub fn entries<'a, I>(config: &SiteConfig, paths: I) -> Vec<SitemapEntry>
where
    I: IntoIterator<Item = &'a str>,
{
    let rules = PriorityRules::new(config);
    let mut entries: Vec<SitemapEntry> = paths
        .into_iter()
        .filter(|path| !is_excluded(config, path))
        .map(|path| SitemapEntry {
            path: path.to_string(),
            priority: rules.priority(path),
        })
        .collect();
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    entries.dedup_by(|a, b| a.path == b.path);
    entries
}

pub fn render_sitemap(config: &SiteConfig, entries: &[SitemapEntry]) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    xml.push('\n');
    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!(
            "    <loc>{}</loc>\n",
            full_url(config, &entry.path).replace('&', "&amp;")
        ));
        xml.push_str(&format!("    <changefreq>{}</changefreq>\n", CHANGEFREQ));
        xml.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Write the sitemap for `paths` under `out_dir`
pub fn write<'a, I>(config: &SiteConfig, paths: I, out_dir: &Path) -> Result<PathBuf>
where
    I: IntoIterator<Item = &'a str>,
{
    let entries = entries(config, paths);
    let output_path = out_dir.join(config.sitemap.output.trim_start_matches('/'));
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output_path, render_sitemap(config, &entries))?;
    tracing::info!("Generated {} with {} urls", config.sitemap.output, entries.len());
    Ok(output_path)
}
