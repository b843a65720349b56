//! Responsive inline images

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::{local_target, StageContext};

lazy_static! {
    // The exact shape pulldown-cmark emits for `![alt](src "title")`
    static ref IMG_RE: Regex =
        Regex::new(r#"<img src="([^"]*)" alt="([^"]*)"(?: title="([^"]*)")? />"#).unwrap();
}

const RASTER_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Publish local raster images at no more than the configured width and
/// wrap them for responsive display. Remote images, vector images and
/// images that cannot be found are left alone for the linked-file stage.
pub fn rewrite(html: String, ctx: &StageContext) -> String {
    if !html.contains("<img ") {
        return html;
    }

    IMG_RE
        .replace_all(&html, |caps: &Captures| {
            responsive(caps, ctx).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn responsive(caps: &Captures, ctx: &StageContext) -> Option<String> {
    let src = &caps[1];
    let alt = &caps[2];

    let path = local_target(ctx.record_dir, src)?;
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if !RASTER_EXTENSIONS.contains(&ext.as_str()) || !path.is_file() {
        return None;
    }

    let max_width = ctx.markdown.image_max_width;
    let published = match ctx.files.publish_image(&path, max_width) {
        Ok(published) => published,
        Err(e) => {
            tracing::warn!("[{}] could not process image {:?}: {}", ctx.id, path, e);
            return None;
        }
    };

    let title = caps
        .get(3)
        .map(|t| format!(r#" title="{}""#, t.as_str()))
        .unwrap_or_default();
    let url = &published.file.url;

    Some(format!(
        concat!(
            r#"<span class="responsive-image-wrapper" style="position: relative; display: block; margin-left: auto; margin-right: auto; max-width: {width}px;">"#,
            r#"<a class="responsive-image-link" href="{url}" style="display: block;" target="_blank" rel="noopener">"#,
            r#"<img class="responsive-image" src="{url}" alt="{alt}"{title} width="{width}" style="width: 100%; height: auto; margin: 0; vertical-align: middle;" loading="lazy" />"#,
            r#"</a></span>"#
        ),
        width = published.width,
        url = url,
        alt = alt,
        title = title,
    ))
}

#[cfg(test)]
mod tests {
    use super::super::tests::with_context;
    use super::*;
    use std::fs;

    #[test]
    fn test_local_image_is_wrapped() {
        with_context(|ctx, dir| {
            image::RgbImage::new(1000, 500)
                .save(dir.join("photo.png"))
                .unwrap();

            let html = r#"<p><img src="./photo.png" alt="A photo" title="Sunset" /></p>"#;
            let out = rewrite(html.to_string(), ctx);

            assert!(out.contains(r#"class="responsive-image-wrapper""#));
            assert!(out.contains("max-width: 590px;"));
            assert!(out.contains(r#"alt="A photo" title="Sunset""#));
            assert!(out.contains(r#"src="/static/"#));
            assert!(!out.contains("./photo.png"));
        });
    }

    #[test]
    fn test_small_image_keeps_natural_width() {
        with_context(|ctx, dir| {
            image::RgbImage::new(300, 200)
                .save(dir.join("small.png"))
                .unwrap();
            let out = rewrite(r#"<img src="small.png" alt="" />"#.to_string(), ctx);
            assert!(out.contains("max-width: 300px;"));
        });
    }

    #[test]
    fn test_remote_and_missing_images_untouched() {
        with_context(|ctx, dir| {
            fs::write(dir.join("logo.svg"), "<svg/>").unwrap();
            let html = concat!(
                r#"<img src="https://example.com/a.png" alt="remote" />"#,
                r#"<img src="missing.png" alt="missing" />"#,
                r#"<img src="logo.svg" alt="vector" />"#
            );
            assert_eq!(rewrite(html.to_string(), ctx), html);
        });
    }
}
