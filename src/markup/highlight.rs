//! Syntax highlighting of fenced code blocks

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use super::text::decode_entities;
use super::StageContext;
use crate::config::HighlightConfig;

lazy_static! {
    static ref CODE_BLOCK_RE: Regex =
        Regex::new(r#"(?s)<pre><code class="language-([^"]+)">(.*?)</code></pre>"#).unwrap();
}

/// Syntax and theme sets, loaded once per build and shared by every record
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Option<Theme>,
    enabled: bool,
}

impl Highlighter {
    pub fn new(config: &HighlightConfig) -> Self {
        if !config.enable {
            return Self::disabled();
        }

        let mut theme_set = ThemeSet::load_defaults();
        let theme = match theme_set.themes.remove(&config.theme) {
            Some(theme) => Some(theme),
            None => {
                tracing::warn!(
                    "Unknown highlight theme '{}', falling back to the first bundled theme",
                    config.theme
                );
                let first = theme_set.themes.keys().next().cloned();
                first.and_then(|name| theme_set.themes.remove(&name))
            }
        };

        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
            enabled: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            syntax_set: SyntaxSet::new(),
            theme: None,
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && self.theme.is_some()
    }

    /// Highlight `code` as `lang`; `None` when the language is unknown
    pub fn highlight(&self, code: &str, lang: &str) -> Option<String> {
        let theme = self.theme.as_ref()?;
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))?;
        highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
    }
}

/// Replace fenced code blocks that name a known language with highlighted
/// markup. Blocks without a language, or with one the highlighter does
/// not know, stay as plain preformatted text.
pub fn apply(html: String, ctx: &StageContext) -> String {
    if !ctx.highlighter.is_enabled() || !html.contains("<pre><code class=\"language-") {
        return html;
    }

    CODE_BLOCK_RE
        .replace_all(&html, |caps: &Captures| {
            let lang = language(&caps[1]);
            let code = decode_entities(&caps[2]);
            match ctx.highlighter.highlight(&code, lang) {
                Some(highlighted) => format!(
                    r#"<div class="highlight" data-language="{}">{}</div>"#,
                    lang, highlighted
                ),
                None => {
                    tracing::warn!("[{}] no syntax for code block language '{}'", ctx.id, lang);
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

/// Drop line-highlight annotations such as `js{1,3-5}`
fn language(info: &str) -> &str {
    let info = info.split('{').next().unwrap_or(info);
    info.trim()
}

#[cfg(test)]
mod tests {
    use super::super::tests::with_context;
    use super::*;

    #[test]
    fn test_language_strips_annotations() {
        assert_eq!(language("js{1,3-5}"), "js");
        assert_eq!(language("rust"), "rust");
    }

    #[test]
    fn test_known_language_highlighted() {
        with_context(|ctx, _| {
            let html = "<pre><code class=\"language-rust\">fn main() { let x = &amp;1; }\n</code></pre>\n";
            let out = apply(html.to_string(), ctx);
            assert!(out.starts_with(r#"<div class="highlight" data-language="rust"><pre"#));
            assert!(out.contains("main"));
            assert!(!out.contains("<code class=\"language-rust\">"));
        });
    }

    #[test]
    fn test_unknown_language_untouched() {
        with_context(|ctx, _| {
            let html = "<pre><code class=\"language-nosuchlang\">x\n</code></pre>";
            assert_eq!(apply(html.to_string(), ctx), html);
        });
    }

    #[test]
    fn test_plain_block_untouched() {
        with_context(|ctx, _| {
            let html = "<pre><code>plain\n</code></pre>";
            assert_eq!(apply(html.to_string(), ctx), html);
        });
    }

    #[test]
    fn test_disabled_highlighter() {
        let highlighter = Highlighter::disabled();
        assert!(!highlighter.is_enabled());
        assert_eq!(highlighter.highlight("fn main() {}", "rust"), None);
    }
}
