//! Content loader - discovers records in the configured collections

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::{AssetFile, Collection, FrontMatter, RawRecord};
use crate::config::CollectionConfig;
use crate::error::{BuildError, Result};
use crate::Site;

/// Everything the loader found, in load order
#[derive(Debug, Default)]
pub struct LoadedContent {
    pub records: Vec<RawRecord>,
    pub assets: Vec<AssetFile>,
}

/// Loads content from the source directory
pub struct ContentLoader<'a> {
    site: &'a Site,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Self {
        Self { site }
    }

    /// Load every collection. Posts come first, then newsletter issues;
    /// within a collection files are visited in file-name order, so the
    /// resulting `order` is stable across rebuilds.
    pub fn load(&self) -> Result<LoadedContent> {
        let mut records = self.load_collection(Collection::Post)?;
        records.extend(self.load_collection(Collection::NewsletterIssue)?);
        for (order, record) in records.iter_mut().enumerate() {
            record.order = order;
        }

        let assets = self.load_assets()?;

        tracing::debug!(
            "Loaded {} records and {} assets",
            records.len(),
            assets.len()
        );
        Ok(LoadedContent { records, assets })
    }

    /// Load the markdown records of one collection
    pub fn load_collection(&self, collection: Collection) -> Result<Vec<RawRecord>> {
        let Some(root) = self.collection_root(collection)? else {
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        for entry in walk(&root) {
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }
            if let Some(record) = load_record(&root, path, collection)? {
                records.push(record);
            }
        }

        Ok(records)
    }

    /// List the files of the asset collection
    pub fn load_assets(&self) -> Result<Vec<AssetFile>> {
        let Some(root) = self.collection_root(Collection::Asset)? else {
            return Ok(Vec::new());
        };

        let assets = walk(&root)
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(&root).ok()?.to_path_buf();
                Some(AssetFile {
                    source: entry.path().to_path_buf(),
                    relative,
                })
            })
            .collect();

        Ok(assets)
    }

    /// Resolve a collection's directory. A missing optional collection is
    /// simply empty; a missing required one aborts the build.
    fn collection_root(&self, collection: Collection) -> Result<Option<PathBuf>> {
        let config = self.collection_config(collection);
        let root = self.site.source_dir.join(&config.path);

        if root.is_dir() {
            return Ok(Some(root));
        }
        if config.required {
            return Err(BuildError::MissingCollection {
                name: config.path.clone(),
                path: root,
            });
        }
        tracing::debug!("Optional collection {} not found at {:?}", collection, root);
        Ok(None)
    }

    fn collection_config(&self, collection: Collection) -> &CollectionConfig {
        let collections = &self.site.config.collections;
        match collection {
            Collection::Post => &collections.blog,
            Collection::NewsletterIssue => &collections.newsletter,
            Collection::Asset => &collections.assets,
        }
    }
}

/// Read one markdown file. Files that are not valid UTF-8 are skipped with
/// a warning; they never abort the rest of the build. Unparseable
/// front-matter does.
fn load_record(root: &Path, path: &Path, collection: Collection) -> Result<Option<RawRecord>> {
    let id = record_id(root, path);
    let bytes = fs::read(path)?;
    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Skipping record '{}' ({:?}): {}", id, path, e);
            return Ok(None);
        }
    };

    let (front_matter, body) =
        FrontMatter::parse(&content).map_err(|e| BuildError::InvalidFrontMatter {
            id: id.clone(),
            message: e.to_string(),
        })?;

    Ok(Some(RawRecord {
        id,
        collection,
        source: path.to_path_buf(),
        raw_body: body.to_string(),
        front_matter,
        order: 0,
    }))
}

/// `blog/my-post/index.md` and `blog/my-post.md` both become `my-post`
fn record_id(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let stem = relative.file_stem().and_then(|s| s.to_str()).unwrap_or("");

    let base = if stem == "index" {
        relative.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        relative.with_extension("")
    };

    let id = base
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect::<Vec<_>>()
        .join("/");

    if id.is_empty() {
        "index".to_string()
    } else {
        id
    }
}

fn walk(root: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        .filter_map(|e| e.ok())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}
