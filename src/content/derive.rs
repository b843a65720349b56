//! Field deriver - validates front-matter and attaches the slug

use std::collections::HashMap;

use super::{parse_date, Canonical, Collection, ContentRecord, RawRecord};
use crate::config::SiteConfig;
use crate::error::{BuildError, Result};

/// Turn a raw record into a validated [`ContentRecord`].
///
/// `title` and `date` are required, and `canonicalName` is required
/// whenever `canonical` is set.
pub fn derive(raw: RawRecord, config: &SiteConfig) -> Result<ContentRecord> {
    let fm = raw.front_matter;

    let title = fm
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| BuildError::MissingRequiredField {
            id: raw.id.clone(),
            field: "title",
        })?;

    let date_value = fm.date.ok_or_else(|| BuildError::MissingRequiredField {
        id: raw.id.clone(),
        field: "date",
    })?;
    let date = parse_date(&date_value).ok_or_else(|| BuildError::InvalidDate {
        id: raw.id.clone(),
        value: date_value.clone(),
    })?;

    let canonical = match (fm.canonical, fm.canonical_name) {
        (Some(url), Some(name)) if !name.trim().is_empty() => Some(Canonical { url, name }),
        (Some(_), _) => {
            return Err(BuildError::MissingCanonicalName { id: raw.id });
        }
        (None, _) => None,
    };

    let slug = slug_for(raw.collection, &raw.id, config);

    Ok(ContentRecord {
        slug,
        collection: raw.collection,
        source: raw.source,
        raw_body: raw.raw_body,
        order: raw.order,
        title,
        date,
        description: fm.description.filter(|d| !d.trim().is_empty()),
        published: fm.published.unwrap_or(true),
        newsletter: fm.newsletter.unwrap_or(false),
        canonical,
        tags: fm.tags.into_iter().filter(|t| !t.trim().is_empty()).collect(),
        cover_image: fm.cover_image,
        blog_og_image: fm.blog_og_image,
        id: raw.id,
    })
}

/// URL path for a record. Posts live at the site root, newsletter issues
/// under the newsletter directory, so the collection is part of the slug.
pub fn slug_for(collection: Collection, id: &str, config: &SiteConfig) -> String {
    let path = id
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let slug = slug::slugify(segment);
            if slug.is_empty() {
                segment.to_string()
            } else {
                slug
            }
        })
        .collect::<Vec<_>>()
        .join("/");

    match collection {
        Collection::NewsletterIssue => format!("/{}/{}/", config.newsletter_dir, path),
        Collection::Post | Collection::Asset => format!("/{}/", path),
    }
}

/// Fail on the first slug claimed twice, either by two records or by a
/// record and a generated listing page.
pub fn check_unique_slugs<'a, I>(records: I, reserved: &[String]) -> Result<()>
where
    I: IntoIterator<Item = &'a ContentRecord>,
{
    let mut seen: HashMap<&str, &str> = reserved
        .iter()
        .map(|path| (path.as_str(), "<generated page>"))
        .collect();

    for record in records {
        if let Some(first) = seen.insert(&record.slug, &record.id) {
            return Err(BuildError::DuplicateSlug {
                slug: record.slug.clone(),
                first: first.to_string(),
                second: record.id.clone(),
            });
        }
    }

    Ok(())
}
