//! Responsive iframe embeds

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::StageContext;

lazy_static! {
    static ref IFRAME_RE: Regex = Regex::new(r#"(?is)<iframe\b([^>]*)>(.*?)</iframe>"#).unwrap();
    static ref WIDTH_RE: Regex = Regex::new(r#"(?i)\bwidth="?(\d+)"#).unwrap();
    static ref HEIGHT_RE: Regex = Regex::new(r#"(?i)\bheight="?(\d+)"#).unwrap();
    static ref STYLE_RE: Regex = Regex::new(r#"(?i)\s+style="[^"]*""#).unwrap();
}

/// 16:9, for embeds that do not declare their size
const DEFAULT_RATIO: f64 = 56.25;

/// Wrap every iframe in a container that keeps its aspect ratio at any width
pub fn wrap(html: String, ctx: &StageContext) -> String {
    if !html.contains("<iframe") && !html.contains("<IFRAME") {
        return html;
    }

    IFRAME_RE
        .replace_all(&html, |caps: &Captures| {
            let attrs = &caps[1];
            let ratio = aspect_ratio(attrs);
            let attrs = STYLE_RE.replace_all(attrs, "");

            format!(
                concat!(
                    r#"<div class="responsive-iframe-container" style="padding-bottom: {ratio}%; position: relative; height: 0; overflow: hidden; {wrapper}">"#,
                    r#"<iframe{attrs} style="position: absolute; top: 0; left: 0; width: 100%; height: 100%;">{inner}</iframe>"#,
                    r#"</div>"#
                ),
                ratio = ratio,
                wrapper = ctx.markdown.iframe_wrapper_style,
                attrs = attrs.trim_end(),
                inner = &caps[2],
            )
        })
        .into_owned()
}

/// Height as a percentage of width, rounded to four decimals
fn aspect_ratio(attrs: &str) -> f64 {
    let dimension = |re: &Regex| -> Option<f64> {
        re.captures(attrs)
            .and_then(|c| c[1].parse::<f64>().ok())
            .filter(|v| *v > 0.0)
    };

    match (dimension(&*WIDTH_RE), dimension(&*HEIGHT_RE)) {
        (Some(w), Some(h)) => (h / w * 100.0 * 10_000.0).round() / 10_000.0,
        _ => DEFAULT_RATIO,
    }
}
