//! Build the site
//!
//! A build is all-or-nothing: everything is written into a staging
//! directory, and only a build that finished without error replaces the
//! public directory.

use anyhow::{Context, Result};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::content::derive::{check_unique_slugs, derive};
use crate::content::loader::ContentLoader;
use crate::content::{AssetFile, ContentRecord, Document};
use crate::generator::{listing_paths, page_paths, Generator};
use crate::graph::PageGraph;
use crate::markup::{MarkupPipeline, StaticFiles};
use crate::{error, feed, sitemap, Site};

/// What a successful build produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    /// Records loaded, drafts included
    pub records: usize,
    /// Records rendered into pages
    pub published: usize,
    pub pages: usize,
    pub tags: usize,
}

/// Build the site into the public directory
pub fn run(site: &Site) -> Result<BuildSummary> {
    let start = Instant::now();
    let staging = site.staging_dir();
    if staging.exists() {
        fs::remove_dir_all(&staging)
            .with_context(|| format!("Failed to remove stale staging dir {:?}", staging))?;
    }
    fs::create_dir_all(&staging)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(site.config.threads.unwrap_or(0))
        .build()?;

    let summary = match pool.install(|| build_into(site, &staging)) {
        Ok(summary) => summary,
        Err(e) => {
            discard(&staging);
            return Err(e.into());
        }
    };

    if let Err(e) = publish(site, &staging) {
        discard(&staging);
        return Err(e);
    }

    tracing::info!(
        "Built {} pages from {} records in {:.2}s",
        summary.pages,
        summary.records,
        start.elapsed().as_secs_f64()
    );
    Ok(summary)
}

/// Run the whole pipeline, writing into `out_dir`
fn build_into(site: &Site, out_dir: &Path) -> error::Result<BuildSummary> {
    let config = &site.config;
    let loaded = ContentLoader::new(site).load()?;
    let total = loaded.records.len();

    // Errors are reported for the first failing record in load order,
    // whichever thread finished first
    let derived: Vec<error::Result<ContentRecord>> = loaded
        .records
        .into_par_iter()
        .map(|raw| derive(raw, config))
        .collect();
    let records = derived.into_iter().collect::<error::Result<Vec<_>>>()?;

    let (published, drafts): (Vec<ContentRecord>, Vec<ContentRecord>) =
        records.into_iter().partition(|r| r.published);
    if !drafts.is_empty() {
        tracing::info!("Skipping {} unpublished records", drafts.len());
    }

    let graph = PageGraph::build(&published);
    let reserved = listing_paths(config, &graph);
    check_unique_slugs(published.iter().chain(drafts.iter()), &reserved)?;

    copy_assets(&loaded.assets, out_dir)?;

    let files = StaticFiles::new(out_dir, &config.static_dir);
    let pipeline = MarkupPipeline::new(config);
    // Indexed collect keeps load order, so `graph` indices stay valid
    let documents: Vec<Document> = published
        .into_par_iter()
        .map(|record| pipeline.render_document(record, &files))
        .collect();

    let generator = Generator::new(config, out_dir)?;
    let pages = generator.generate(&documents, &graph)?;

    let paths = page_paths(config, &documents, &graph);
    let (feed_result, sitemap_result) = rayon::join(
        || feed::write_feed(config, &documents, out_dir),
        || sitemap::write(config, paths.iter().map(String::as_str), out_dir),
    );
    feed_result?;
    sitemap_result?;

    Ok(BuildSummary {
        records: total,
        published: documents.len(),
        pages,
        tags: graph.tags().len(),
    })
}

fn copy_assets(assets: &[AssetFile], out_dir: &Path) -> error::Result<()> {
    for asset in assets {
        let dest = out_dir.join(&asset.relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&asset.source, &dest)?;
    }
    if !assets.is_empty() {
        tracing::debug!("Copied {} assets", assets.len());
    }
    Ok(())
}

/// Swap the finished staging directory in for the public directory
fn publish(site: &Site, staging: &Path) -> Result<()> {
    let public = &site.public_dir;
    let retired = site.retired_dir();

    if retired.exists() {
        fs::remove_dir_all(&retired)?;
    }
    if public.exists() {
        fs::rename(public, &retired)
            .with_context(|| format!("Failed to move {:?} aside", public))?;
    }
    if let Err(e) = fs::rename(staging, public) {
        if retired.exists() {
            fs::rename(&retired, public)?;
        }
        return Err(e).with_context(|| format!("Failed to publish {:?}", staging));
    }
    if retired.exists() {
        fs::remove_dir_all(&retired)?;
    }
    Ok(())
}

fn discard(staging: &Path) {
    if let Err(e) = fs::remove_dir_all(staging) {
        tracing::warn!("Failed to remove staging dir {:?}: {}", staging, e);
    }
}

/// Rebuild whenever content or configuration changes. Blocks until the
/// watcher shuts down.
pub fn watch<F>(site: &Site, mut on_rebuild: F) -> Result<()>
where
    F: FnMut(&BuildSummary),
{
    let (tx, rx) = channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    debouncer
        .watcher()
        .watch(&site.source_dir, RecursiveMode::Recursive)?;
    let config_path = site.config_path();
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching {:?} for changes. Press Ctrl+C to stop.", site.source_dir);

    for result in rx {
        let events = match result {
            Ok(events) => events,
            Err(e) => {
                tracing::error!("Watch error: {:?}", e);
                continue;
            }
        };

        let relevant = events.iter().any(|e| {
            let path = e.path.to_string_lossy();
            !path.contains(".git") && !path.contains(".DS_Store") && !path.ends_with('~')
        });
        if !relevant {
            continue;
        }

        tracing::info!("Change detected, rebuilding...");
        // Configuration may have changed too
        let fresh = match Site::new(&site.base_dir) {
            Ok(fresh) => fresh,
            Err(e) => {
                tracing::error!("Failed to reload configuration: {:#}", e);
                continue;
            }
        };
        match run(&fresh) {
            Ok(summary) => on_rebuild(&summary),
            Err(e) => tracing::error!("Build failed: {:#}", e),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn sample_site() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "_config.yml",
            "title: Test Blog\nurl: https://blog.example.com\n",
        );
        write(
            root,
            "content/blog/hello-world/index.md",
            "---\ntitle: Hello World\ndate: 2020-01-01\ntags: [Rust, JavaScript]\n---\n## Intro\n\nSee [the notes](./notes.txt).\n",
        );
        write(root, "content/blog/hello-world/notes.txt", "notes");
        write(
            root,
            "content/blog/second-post/index.md",
            "---\ntitle: Second Post\ndate: 2020-02-01\ntags: Rust\n---\n\"Quoted\" text.\n",
        );
        write(
            root,
            "content/blog/newsletter-only/index.md",
            "---\ntitle: For Subscribers\ndate: 2020-03-01\nnewsletter: true\n---\nHi.\n",
        );
        write(
            root,
            "content/blog/draft/index.md",
            "---\ntitle: Draft\ndate: 2020-04-01\npublished: false\n---\nWIP\n",
        );
        write(
            root,
            "content/newsletter/1/index.md",
            "---\ntitle: Issue 1\ndate: 2020-02-15\n---\nFirst issue.\n",
        );
        write(root, "content/assets/avatar.png", "png");
        dir
    }

    #[test]
    fn test_full_build() {
        let dir = sample_site();
        let site = Site::new(dir.path()).unwrap();
        let summary = run(&site).unwrap();

        assert_eq!(summary.records, 5);
        assert_eq!(summary.published, 4);
        assert_eq!(summary.tags, 2);

        let public = &site.public_dir;
        let hello = fs::read_to_string(public.join("hello-world/index.html")).unwrap();
        assert!(hello.contains(r#"<h2 id="intro""#));
        assert!(hello.contains(r#"<a href="/static/"#));
        assert!(hello.contains(r#"rel="next""#));
        assert!(!public.join("draft/index.html").exists());
        assert!(public.join("newsletter/1/index.html").exists());
        assert!(public.join("tags/java-script/index.html").exists());
        assert!(public.join("avatar.png").exists());
        assert!(!site.staging_dir().exists());

        let rss = fs::read_to_string(public.join("rss.xml")).unwrap();
        assert_eq!(rss.matches("<item>").count(), 2);
        assert!(rss.find("second-post") < rss.find("hello-world"));
        assert!(!rss.contains("newsletter-only"));
        assert!(!rss.contains("Draft"));

        let sitemap = fs::read_to_string(public.join("sitemap.xml")).unwrap();
        assert!(sitemap.contains("<loc>https://blog.example.com/</loc>"));
        assert!(sitemap.contains("<loc>https://blog.example.com/newsletter/</loc>"));
        assert!(!sitemap.contains("/newsletter/1/"));
        assert!(!sitemap.contains("/draft/"));
        assert!(sitemap.contains("<loc>https://blog.example.com/newsletter-only/</loc>"));
    }

    #[test]
    fn test_build_is_reproducible() {
        let dir = sample_site();
        let site = Site::new(dir.path()).unwrap();

        run(&site).unwrap();
        let first_rss = fs::read_to_string(site.public_dir.join("rss.xml")).unwrap();
        let first_page = fs::read_to_string(site.public_dir.join("hello-world/index.html")).unwrap();
        run(&site).unwrap();
        let second_rss = fs::read_to_string(site.public_dir.join("rss.xml")).unwrap();
        let second_page = fs::read_to_string(site.public_dir.join("hello-world/index.html")).unwrap();

        assert_eq!(first_rss, second_rss);
        assert_eq!(first_page, second_page);
    }

    #[test]
    fn test_failed_build_leaves_previous_output() {
        let dir = sample_site();
        let site = Site::new(dir.path()).unwrap();
        run(&site).unwrap();
        let before = fs::read_to_string(site.public_dir.join("rss.xml")).unwrap();

        // Same slug as an existing post
        write(
            dir.path(),
            "content/blog/Hello World.md",
            "---\ntitle: Clash\ndate: 2021-01-01\n---\nBody\n",
        );
        let err = run(&site).unwrap_err();
        assert!(err.to_string().contains("duplicate slug '/hello-world/'"));

        let after = fs::read_to_string(site.public_dir.join("rss.xml")).unwrap();
        assert_eq!(before, after);
        assert!(!site.staging_dir().exists());
    }

    #[test]
    fn test_missing_field_names_record() {
        let dir = sample_site();
        write(
            dir.path(),
            "content/blog/untitled/index.md",
            "---\ndate: 2020-01-01\n---\nBody\n",
        );
        let site = Site::new(dir.path()).unwrap();
        let err = run(&site).unwrap_err();
        assert!(err.to_string().contains("'untitled'"));
        assert!(!site.public_dir.exists());
    }

    #[test]
    fn test_post_without_body_is_published() {
        let dir = sample_site();
        write(
            dir.path(),
            "content/blog/front-matter-only/index.md",
            "---\ntitle: Front Matter Only\ndate: 2020-05-01\n---\n",
        );
        let site = Site::new(dir.path()).unwrap();
        let summary = run(&site).unwrap();
        assert_eq!(summary.published, 5);

        let rss = fs::read_to_string(site.public_dir.join("rss.xml")).unwrap();
        assert_eq!(rss.matches("<item>").count(), 3);
        assert!(rss.contains("front-matter-only"));
        assert!(site.public_dir.join("front-matter-only/index.html").exists());
    }

    #[test]
    fn test_slug_clashing_with_generated_page() {
        let dir = sample_site();
        write(
            dir.path(),
            "content/blog/thank-you/index.md",
            "---\ntitle: Thanks\ndate: 2020-01-01\n---\nBody\n",
        );
        let site = Site::new(dir.path()).unwrap();
        assert!(run(&site).is_err());
    }
}
