//! Generator module - writes every HTML page of the site using the built-in
//! Tera templates

use chrono::Datelike;
use std::fs;
use std::path::{Path, PathBuf};
use tera::Context;

use crate::config::SiteConfig;
use crate::content::{Collection, Document};
use crate::error::Result;
use crate::graph::{tag_path, PageGraph, TagBucket};
use crate::helpers::{date_xml, display_date, full_url, site_path};
use crate::templates::{
    NavPost, PostSummary, PostView, SiteView, TagLink, TagSummary, TemplateRenderer,
};
use crate::views::view_key;

/// Paths of the generated listing pages: home, newsletter listing, tag
/// pages and transactional pages
pub fn listing_paths(config: &SiteConfig, graph: &PageGraph) -> Vec<String> {
    let mut paths = vec![
        "/".to_string(),
        site_path(&[&config.newsletter_dir]),
        site_path(&[&config.tag_dir]),
    ];
    paths.extend(
        graph
            .tags()
            .iter()
            .map(|bucket| site_path(&[&config.tag_dir, &bucket.key])),
    );
    paths.extend(config.sitemap.transactional_pages.iter().cloned());
    paths
}

/// Every page the build writes
pub fn page_paths(config: &SiteConfig, documents: &[Document], graph: &PageGraph) -> Vec<String> {
    let mut paths = listing_paths(config, graph);
    for collection in [Collection::Post, Collection::NewsletterIssue] {
        paths.extend(
            graph
                .ordered(collection)
                .iter()
                .map(|&i| documents[i].record.slug.clone()),
        );
    }
    paths
}

/// Static site generator using Tera templates
pub struct Generator<'a> {
    config: &'a SiteConfig,
    out_dir: &'a Path,
    renderer: TemplateRenderer,
}

impl<'a> Generator<'a> {
    pub fn new(config: &'a SiteConfig, out_dir: &'a Path) -> Result<Self> {
        Ok(Self {
            config,
            out_dir,
            renderer: TemplateRenderer::new()?,
        })
    }

    /// Write every page; returns the number of pages written
    pub fn generate(&self, documents: &[Document], graph: &PageGraph) -> Result<usize> {
        let site = self.site_view(documents, graph);
        let mut written = 0;

        written += self.generate_index(&site, documents, graph)?;
        written += self.generate_posts(&site, documents, graph)?;
        written += self.generate_newsletter(&site, documents, graph)?;
        written += self.generate_tag_pages(&site, documents, graph)?;
        written += self.generate_transactional_pages(&site)?;

        tracing::info!("Generated {} pages", written);
        Ok(written)
    }

    fn site_view(&self, documents: &[Document], graph: &PageGraph) -> SiteView {
        let newest = [Collection::Post, Collection::NewsletterIssue]
            .iter()
            .filter_map(|&c| graph.ordered(c).first())
            .map(|&i| documents[i].record.date)
            .max();
        let config = self.config;

        SiteView {
            title: config.title.clone(),
            description: config.description.clone(),
            url: config.base_url().to_string(),
            author_name: config.author.name.clone(),
            author_summary: config.author.summary.clone(),
            author_landing_page: config.author.landing_page.clone(),
            twitter: config.social.twitter.clone(),
            feed_path: config.feed.output.trim_start_matches('/').to_string(),
            year: newest.unwrap_or_else(chrono::Utc::now).year(),
        }
    }

    fn base_context(&self, site: &SiteView, title: Option<&str>, path: &str) -> Context {
        let mut context = Context::new();
        context.insert("site", site);
        if let Some(title) = title {
            context.insert("page_title", title);
        }
        context.insert("current_path", path);
        context.insert("is_home", &(path == "/"));
        context.insert("tag_dir", &self.config.tag_dir);
        context
    }

    fn generate_index(
        &self,
        site: &SiteView,
        documents: &[Document],
        graph: &PageGraph,
    ) -> Result<usize> {
        let posts = summaries(documents, graph.ordered(Collection::Post));
        let mut context = self.base_context(site, None, "/");
        context.insert("posts", &posts);
        self.write_page("/", "index.html", &context)?;
        Ok(1)
    }

    fn generate_posts(
        &self,
        site: &SiteView,
        documents: &[Document],
        graph: &PageGraph,
    ) -> Result<usize> {
        let ordered = graph.ordered(Collection::Post);
        for &index in ordered {
            let doc = &documents[index];
            let post = self.post_view(doc, index, documents, graph);

            let mut context = self.base_context(site, Some(&doc.record.title), &post.path);
            context.insert(
                "page_description",
                doc.record.description.as_deref().unwrap_or(&doc.excerpt),
            );
            if let Some(canonical) = &doc.record.canonical {
                context.insert("canonical_url", &canonical.url);
            }
            if let Some(image) = doc.og_image_url.as_ref().or(doc.cover_image_url.as_ref()) {
                context.insert("og_image", &full_url(self.config, image));
            }
            context.insert("post", &post);

            self.write_page(&post.path, "post.html", &context)?;
        }
        Ok(ordered.len())
    }

    fn generate_newsletter(
        &self,
        site: &SiteView,
        documents: &[Document],
        graph: &PageGraph,
    ) -> Result<usize> {
        let ordered = graph.ordered(Collection::NewsletterIssue);
        let listing_path = site_path(&[&self.config.newsletter_dir]);

        let mut context = self.base_context(site, Some("Newsletter"), &listing_path);
        context.insert("posts", &summaries(documents, ordered));
        self.write_page(&listing_path, "newsletter_index.html", &context)?;

        for &index in ordered {
            let doc = &documents[index];
            let issue = self.post_view(doc, index, documents, graph);

            let mut context = self.base_context(site, Some(&doc.record.title), &issue.path);
            if let Some(description) = &doc.record.description {
                context.insert("page_description", description);
            }
            context.insert("post", &issue);
            self.write_page(&issue.path, "newsletter.html", &context)?;
        }
        Ok(ordered.len() + 1)
    }

    fn generate_tag_pages(
        &self,
        site: &SiteView,
        documents: &[Document],
        graph: &PageGraph,
    ) -> Result<usize> {
        let buckets = graph.tags().sorted();
        let tags: Vec<TagSummary> = buckets
            .iter()
            .map(|bucket| self.tag_summary(bucket))
            .collect();

        let tags_path = site_path(&[&self.config.tag_dir]);
        let mut context = self.base_context(site, Some("Tags"), &tags_path);
        context.insert("tags", &tags);
        self.write_page(&tags_path, "tags.html", &context)?;

        for (bucket, tag) in buckets.iter().zip(&tags) {
            let posts = summaries(documents, &bucket.members);
            let title = format!("Posts tagged \"{}\"", tag.name);
            let mut context = self.base_context(site, Some(&title), &tag.path);
            context.insert("tag", tag);
            context.insert("posts", &posts);
            self.write_page(&tag.path, "tag.html", &context)?;
        }

        tracing::info!("Generated {} tag pages", tags.len());
        Ok(tags.len() + 1)
    }

    fn generate_transactional_pages(&self, site: &SiteView) -> Result<usize> {
        let pages = &self.config.sitemap.transactional_pages;
        for path in pages {
            let (heading, message) = transactional_copy(path);
            let mut context = self.base_context(site, Some(heading), path);
            context.insert("heading", heading);
            context.insert("message", message);
            self.write_page(path, "transactional.html", &context)?;
        }
        Ok(pages.len())
    }

    fn post_view(
        &self,
        doc: &Document,
        index: usize,
        documents: &[Document],
        graph: &PageGraph,
    ) -> PostView {
        let record = &doc.record;
        let nav = graph.navigation(index);
        let nav_post = |i: usize| NavPost {
            title: documents[i].record.title.clone(),
            path: documents[i].record.slug.clone(),
        };

        PostView {
            title: record.title.clone(),
            path: record.slug.clone(),
            date: display_date(&record.date),
            date_xml: date_xml(&record.date),
            html: doc.html.clone(),
            time_to_read: doc.time_to_read,
            view_key: view_key(record).to_string(),
            canonical: record.canonical.clone(),
            tags: record
                .tags
                .iter()
                .map(|tag| TagLink {
                    name: tag.clone(),
                    path: tag_path(self.config, tag),
                })
                .collect(),
            cover_image: doc.cover_image_url.clone(),
            previous: nav.previous.map(nav_post),
            next: nav.next.map(nav_post),
        }
    }

    fn tag_summary(&self, bucket: &TagBucket) -> TagSummary {
        TagSummary {
            name: bucket.name.clone(),
            key: bucket.key.clone(),
            path: site_path(&[&self.config.tag_dir, &bucket.key]),
            count: bucket.members.len(),
        }
    }

    fn write_page(&self, path: &str, template: &str, context: &Context) -> Result<PathBuf> {
        let html = self.renderer.render(template, context)?;
        let output_path = self
            .out_dir
            .join(path.trim_start_matches('/'))
            .join("index.html");
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, html)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(output_path)
    }
}

fn summaries(documents: &[Document], indices: &[usize]) -> Vec<PostSummary> {
    indices
        .iter()
        .map(|&i| {
            let doc = &documents[i];
            PostSummary {
                title: doc.record.title.clone(),
                path: doc.record.slug.clone(),
                date: display_date(&doc.record.date),
                date_xml: date_xml(&doc.record.date),
                summary: doc
                    .record
                    .description
                    .clone()
                    .unwrap_or_else(|| doc.excerpt.clone()),
                time_to_read: doc.time_to_read,
            }
        })
        .collect()
}

fn transactional_copy(path: &str) -> (&'static str, &'static str) {
    match path.trim_matches('/') {
        "thank-you" => (
            "Thank you for subscribing!",
            "Check your inbox to confirm your subscription.",
        ),
        "confirm-subscription" => (
            "Subscription confirmed",
            "You are on the list. New posts and newsletter issues will land in your inbox.",
        ),
        _ => ("Thank you", "All done."),
    }
}
