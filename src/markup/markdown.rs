//! Markdown to HTML conversion

use pulldown_cmark::{html, Options, Parser};

/// Render markdown to HTML.
///
/// pulldown-cmark never rejects input: malformed constructs fall back to
/// literal text, so a broken record degrades instead of failing the build.
/// Smart punctuation and code highlighting are left to later stages.
pub fn render(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES;
    let parser = Parser::new_ext(markdown, options);

    let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut html_output, parser);
    html_output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let html = render("# Hello World\n\nThis is a test.");
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_fenced_code_keeps_language_class() {
        let html = render("```rust\nfn main() {}\n```");
        assert!(html.contains(r#"<pre><code class="language-rust">fn main() {}"#));
    }

    #[test]
    fn test_malformed_markup_degrades() {
        let html = render("**unclosed [link](\n\n<div>");
        assert!(html.contains("**unclosed"));
    }

    #[test]
    fn test_quotes_left_straight() {
        let html = render("\"quoted\" -- text");
        assert!(html.contains("quoted"));
        assert!(html.contains(" -- text"));
        assert!(!html.contains('“'));
    }
}
