//! Built-in page templates using the Tera template engine
//!
//! Templates are embedded in the binary. The structs below are the only
//! data pages see; they are built by the generator from documents and the
//! page graph.

use serde::Serialize;
use tera::{Context, Tera};

use crate::content::Canonical;
use crate::error::Result;

/// Template renderer with the embedded templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Rendered post HTML and URLs are inserted as-is; templates escape
        // plain text fields explicitly
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("pineapple/layout.html")),
            ("index.html", include_str!("pineapple/index.html")),
            ("post.html", include_str!("pineapple/post.html")),
            ("newsletter.html", include_str!("pineapple/newsletter.html")),
            (
                "newsletter_index.html",
                include_str!("pineapple/newsletter_index.html"),
            ),
            ("tags.html", include_str!("pineapple/tags.html")),
            ("tag.html", include_str!("pineapple/tag.html")),
            ("transactional.html", include_str!("pineapple/transactional.html")),
            // Partials
            (
                "partials/head.html",
                include_str!("pineapple/partials/head.html"),
            ),
            ("partials/bio.html", include_str!("pineapple/partials/bio.html")),
            (
                "partials/view_counter.html",
                include_str!("pineapple/partials/view_counter.html"),
            ),
            (
                "partials/post_summary.html",
                include_str!("pineapple/partials/post_summary.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteView {
    pub title: String,
    pub description: String,
    pub url: String,
    pub author_name: String,
    pub author_summary: String,
    pub author_landing_page: Option<String>,
    pub twitter: Option<String>,
    pub feed_path: String,
    /// Year of the newest document, for the footer
    pub year: i32,
}

/// A listed post or issue
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub title: String,
    pub path: String,
    pub date: String,
    pub date_xml: String,
    /// `description` when set, otherwise the excerpt
    pub summary: String,
    pub time_to_read: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagLink {
    pub name: String,
    pub path: String,
}

/// A post or newsletter issue page
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub title: String,
    pub path: String,
    pub date: String,
    pub date_xml: String,
    pub html: String,
    pub time_to_read: usize,
    pub view_key: String,
    pub canonical: Option<Canonical>,
    pub tags: Vec<TagLink>,
    pub cover_image: Option<String>,
    pub previous: Option<NavPost>,
    pub next: Option<NavPost>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagSummary {
    pub name: String,
    pub key: String,
    pub path: String,
    pub count: usize,
}
