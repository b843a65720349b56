//! Plain-text projection of rendered HTML, excerpts and reading time

/// A piece of an HTML document: either markup or character data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// A tag, comment or doctype, including the angle brackets
    Tag(&'a str),
    Text(&'a str),
}

/// Split HTML into tags and text runs. Quoted attribute values may contain
/// `>`; comments run until `-->`.
pub fn segments(html: &str) -> Vec<Segment<'_>> {
    let bytes = html.as_bytes();
    let mut out = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' || !starts_tag(bytes, i) {
            i += 1;
            continue;
        }
        if text_start < i {
            out.push(Segment::Text(&html[text_start..i]));
        }

        let end = if html[i..].starts_with("<!--") {
            html[i..].find("-->").map(|p| i + p + 3)
        } else {
            find_tag_end(bytes, i)
        }
        .unwrap_or(bytes.len());

        out.push(Segment::Tag(&html[i..end]));
        i = end;
        text_start = end;
    }

    if text_start < bytes.len() {
        out.push(Segment::Text(&html[text_start..]));
    }
    out
}

fn starts_tag(bytes: &[u8], i: usize) -> bool {
    matches!(bytes.get(i + 1), Some(b) if b.is_ascii_alphabetic() || *b == b'/' || *b == b'!')
}

fn find_tag_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(start + offset + 1),
            None => {}
        }
    }
    None
}

/// Lower-cased element name of a tag segment, and whether it closes
pub fn tag_name(tag: &str) -> Option<(String, bool)> {
    let inner = tag.strip_prefix('<')?;
    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let name: String = inner
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    if name.is_empty() {
        None
    } else {
        Some((name.to_ascii_lowercase(), closing))
    }
}

/// Strip HTML tags from content
pub fn strip_html(html: &str) -> String {
    segments(html)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Text(text) => Some(text),
            Segment::Tag(_) => None,
        })
        .collect()
}

/// Decode the character references pulldown-cmark and the transform
/// stages emit, plus numeric references.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let decoded = rest.find(';').filter(|end| *end <= 10).and_then(|end| {
            let entity = &rest[1..end];
            let c = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            }?;
            Some((c, end))
        });

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Escape text for use in HTML content or a double-quoted attribute
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// The text a reader sees: tags stripped, references decoded and runs of
/// whitespace collapsed to single spaces.
pub fn plain_text(html: &str) -> String {
    decode_entities(&strip_html(html))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cut `text` to at most `max_chars` characters on a word boundary,
/// marking the cut with an ellipsis. A single word longer than the limit
/// is the only case that gets cut mid-word.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    let budget = max_chars - 1;
    let byte_end = text
        .char_indices()
        .nth(budget)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let prefix = &text[..byte_end];
    let next_is_break = text[byte_end..]
        .chars()
        .next()
        .map(char::is_whitespace)
        .unwrap_or(true);

    let cut = if next_is_break {
        prefix
    } else {
        match prefix.rfind(char::is_whitespace) {
            Some(pos) => &prefix[..pos],
            None => prefix,
        }
    };

    let cut = cut.trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':'));
    format!("{}…", cut)
}

fn is_cjk(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

/// Count words in plain text. Every CJK ideograph counts as one word;
/// apostrophes inside a word do not split it.
pub fn count_words(text: &str) -> usize {
    let mut count = 0;
    let mut in_word = false;

    for c in text.chars() {
        if is_cjk(c) {
            count += 1;
            in_word = false;
        } else if c.is_alphanumeric() {
            if !in_word {
                in_word = true;
                count += 1;
            }
        } else if in_word && (c == '\'' || c == '’') {
            // stays inside the word
        } else {
            in_word = false;
        }
    }

    count
}

/// Whole minutes of reading at `words_per_minute`, rounded, at least one
pub fn time_to_read(words: usize, words_per_minute: usize) -> usize {
    let wpm = words_per_minute.max(1);
    ((words + wpm / 2) / wpm).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments() {
        let segs = segments(r#"<p class="a>b">Hi <em>there</em></p><!-- x > y -->1 < 2"#);
        assert_eq!(
            segs,
            vec![
                Segment::Tag(r#"<p class="a>b">"#),
                Segment::Text("Hi "),
                Segment::Tag("<em>"),
                Segment::Text("there"),
                Segment::Tag("</em>"),
                Segment::Tag("</p>"),
                Segment::Tag("<!-- x > y -->"),
                Segment::Text("1 < 2"),
            ]
        );
    }

    #[test]
    fn test_tag_name() {
        assert_eq!(tag_name("<PRE class=x>"), Some(("pre".to_string(), false)));
        assert_eq!(tag_name("</code>"), Some(("code".to_string(), true)));
        assert_eq!(tag_name("<!-- c -->"), None);
    }

    #[test]
    fn test_plain_text() {
        let html = "<h2 id=\"x\">Tom &amp; Jerry</h2>\n<p>Cat\nand   <em>mouse</em>&#33;</p>\n";
        assert_eq!(plain_text(html), "Tom & Jerry Cat and mouse!");
    }

    #[test]
    fn test_decode_entities_leaves_unknown() {
        assert_eq!(decode_entities("a &bogus; b & c"), "a &bogus; b & c");
        assert_eq!(decode_entities("&#x27;&quot;"), "'\"");
    }

    #[test]
    fn test_excerpt_short_text_untouched() {
        assert_eq!(excerpt("Short text.", 160), "Short text.");
    }

    #[test]
    fn test_excerpt_word_boundary() {
        let text = "lorem ipsum ".repeat(30);
        let text = text.trim();
        let out = excerpt(text, 160);
        assert!(out.chars().count() <= 160);
        assert!(out.ends_with('…'));
        let body = out.trim_end_matches('…');
        assert!(body.ends_with("lorem") || body.ends_with("ipsum"));
        assert!(text.starts_with(body));
    }

    #[test]
    fn test_excerpt_never_splits_word() {
        let text = "aaaa bbbbbbbbbb cccc";
        assert_eq!(excerpt(text, 10), "aaaa…");
    }

    #[test]
    fn test_excerpt_single_long_word() {
        let text = "x".repeat(200);
        assert_eq!(excerpt(&text, 160).chars().count(), 160);
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words("Hello, world! Don't panic."), 4);
        assert_eq!(count_words("你好世界"), 4);
        assert_eq!(count_words(""), 0);
    }

    #[test]
    fn test_time_to_read() {
        assert_eq!(time_to_read(0, 265), 1);
        assert_eq!(time_to_read(100, 265), 1);
        assert_eq!(time_to_read(530, 265), 2);
        assert_eq!(time_to_read(700, 265), 3);
    }
}
