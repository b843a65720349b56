//! List site content

use anyhow::Result;
use std::fmt::Write;

use crate::content::derive::derive;
use crate::content::loader::ContentLoader;
use crate::content::{Collection, ContentRecord};
use crate::graph::PageGraph;
use crate::Site;

/// List site content by type
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    let loaded = ContentLoader::new(site).load()?;
    let records = loaded
        .records
        .into_iter()
        .map(|raw| derive(raw, &site.config))
        .collect::<crate::error::Result<Vec<_>>>()?;

    print!("{}", listing(&records, content_type)?);
    Ok(())
}

/// The listing for `content_type`, newest first
pub fn listing(records: &[ContentRecord], content_type: &str) -> Result<String> {
    let mut out = String::new();

    match content_type {
        "post" | "posts" => list_collection(&mut out, "Posts", records, Collection::Post)?,
        "newsletter" | "issues" => {
            list_collection(&mut out, "Newsletter issues", records, Collection::NewsletterIssue)?
        }
        "tag" | "tags" => {
            let graph = PageGraph::build(records);
            let tags = graph.tags();
            writeln!(out, "Tags ({}):", tags.len())?;
            let mut buckets: Vec<_> = tags.iter().collect();
            buckets.sort_by(|a, b| b.members.len().cmp(&a.members.len()).then(a.key.cmp(&b.key)));
            for bucket in buckets {
                writeln!(out, "  {} ({})", bucket.name, bucket.members.len())?;
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: posts, newsletter, tags",
                content_type
            );
        }
    }

    Ok(out)
}

fn list_collection(
    out: &mut String,
    heading: &str,
    records: &[ContentRecord],
    collection: Collection,
) -> std::fmt::Result {
    let mut items: Vec<&ContentRecord> = records
        .iter()
        .filter(|r| r.collection == collection)
        .collect();
    items.sort_by(|a, b| b.date.cmp(&a.date).then(a.order.cmp(&b.order)));

    writeln!(out, "{} ({}):", heading, items.len())?;
    for record in items {
        writeln!(
            out,
            "  {} - {} [{}]{}",
            record.date.format("%Y-%m-%d"),
            record.title,
            record.slug,
            if record.published { "" } else { " (draft)" }
        )?;
    }
    Ok(())
}
