//! Create a new post or newsletter issue

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::PathBuf;

use crate::Site;

/// Scaffold `<collection>/<slug>/index.md` for `title`. New records start
/// unpublished.
pub fn create_record(site: &Site, title: &str, layout: &str, now: DateTime<Utc>) -> Result<PathBuf> {
    let collections = &site.config.collections;
    let collection_dir = match layout {
        "post" => &collections.blog.path,
        "newsletter" => &collections.newsletter.path,
        _ => anyhow::bail!("Unknown layout: {}. Available: post, newsletter", layout),
    };

    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Title {:?} does not produce a usable slug", title);
    }

    let target_dir = site.source_dir.join(collection_dir).join(&slug);
    let file_path = target_dir.join("index.md");
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }
    fs::create_dir_all(&target_dir)?;

    let content = format!(
        "---\ntitle: {}\ndate: {}\ndescription: \"\"\npublished: false\ntags: []\n---\n",
        serde_yaml::to_string(title)?.trim_end(),
        now.format("%Y-%m-%d")
    );
    fs::write(&file_path, content)?;

    Ok(file_path)
}

/// Run the new command
pub fn run(site: &Site, title: &str, layout: &str) -> Result<PathBuf> {
    let path = create_record(site, title, layout, Utc::now())?;
    println!("Created: {:?}", path);
    Ok(path)
}
