//! pineapple-rs: a static publisher for a blog and its newsletter
//!
//! Markdown records are loaded from named collections, validated, run
//! through an ordered markup pipeline, linked into a page graph and
//! written out as HTML pages together with an RSS feed and a sitemap.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod feed;
pub mod generator;
pub mod graph;
pub mod helpers;
pub mod markup;
pub mod server;
pub mod sitemap;
pub mod templates;
pub mod views;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A site on disk and its configuration
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Source directory
    pub source_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Site {
    /// Open the site in `base_dir`, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let source_dir = base_dir.join(&config.source_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            source_dir,
            public_dir,
        })
    }

    /// Where a build writes before it replaces the public directory
    pub fn staging_dir(&self) -> PathBuf {
        sibling(&self.public_dir, "staging")
    }

    /// Where the previous public directory is parked during the swap
    pub fn retired_dir(&self) -> PathBuf {
        sibling(&self.public_dir, "old")
    }

    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join("_config.yml")
    }

    /// Build the site
    pub fn build(&self) -> Result<commands::build::BuildSummary> {
        commands::build::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Scaffold a new record
    pub fn new_record(&self, title: &str, layout: &str) -> Result<PathBuf> {
        commands::new::run(self, title, layout)
    }
}

fn sibling(dir: &Path, suffix: &str) -> PathBuf {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "public".to_string());
    dir.with_file_name(format!(".{}.{}", name, suffix))
}
