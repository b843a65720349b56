//! Typographic punctuation: curly quotes, dashes and ellipses

use super::text::{segments, tag_name, Segment};
use super::StageContext;

/// Text inside these elements is shown verbatim
const VERBATIM: [&str; 6] = ["pre", "code", "kbd", "samp", "script", "style"];

/// Elements that start a new run of text for quote matching
const BLOCKS: [&str; 16] = [
    "p", "li", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "td", "th", "div", "br", "dt",
    "dd", "figcaption",
];

/// Replace straight quotes, `--`, `---` and `...` in prose. Code and
/// preformatted text are left untouched.
pub fn smarten(html: String, _ctx: &StageContext) -> String {
    let mut out = String::with_capacity(html.len());
    let mut verbatim_depth = 0usize;
    let mut prev: Option<char> = None;

    for segment in segments(&html) {
        match segment {
            Segment::Tag(tag) => {
                if let Some((name, closing)) = tag_name(tag) {
                    if VERBATIM.contains(&name.as_str()) {
                        if closing {
                            verbatim_depth = verbatim_depth.saturating_sub(1);
                        } else if !tag.ends_with("/>") {
                            verbatim_depth += 1;
                        }
                    } else if BLOCKS.contains(&name.as_str()) {
                        prev = None;
                    }
                }
                out.push_str(tag);
            }
            Segment::Text(text) if verbatim_depth > 0 => {
                prev = text.chars().last().or(prev);
                out.push_str(text);
            }
            Segment::Text(text) => {
                out.push_str(&smarten_text(text, &mut prev));
            }
        }
    }
    out
}

fn smarten_text(text: &str, prev: &mut Option<char>) -> String {
    let text = text.replace("&quot;", "\"").replace("&#39;", "'");
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let (replacement, consumed) = match c {
            '-' if chars.get(i + 1) == Some(&'-') && chars.get(i + 2) == Some(&'-') => ('—', 3),
            '-' if chars.get(i + 1) == Some(&'-') => ('–', 2),
            '.' if chars.get(i + 1) == Some(&'.') && chars.get(i + 2) == Some(&'.') => ('…', 3),
            '"' if opens(*prev) => ('“', 1),
            '"' => ('”', 1),
            '\'' if opens(*prev) => ('‘', 1),
            '\'' => ('’', 1),
            other => (other, 1),
        };
        out.push(replacement);
        *prev = Some(replacement);
        i += consumed;
    }
    out
}

/// A quote opens at the start of a run or after whitespace or an opening
/// bracket or dash
fn opens(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(c) => c.is_whitespace() || matches!(c, '(' | '[' | '{' | '—' | '–' | '“' | '‘'),
    }
}
