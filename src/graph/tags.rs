//! Tag normalization and the tag index

use indexmap::IndexMap;

/// Normalize a tag the way lodash's `kebabCase` does: split into words
/// on punctuation, case changes and letter/digit boundaries, lower-case
/// each word and join with hyphens. Apostrophes are dropped first.
///
/// ```ignore
/// kebab_case("JavaScript")    // "java-script"
/// kebab_case("Ruby on Rails") // "ruby-on-rails"
/// kebab_case("HTMLParser")    // "html-parser"
/// ```
pub fn kebab_case(tag: &str) -> String {
    let cleaned: String = tag.chars().filter(|c| !matches!(c, '\'' | '’')).collect();

    let mut words: Vec<String> = Vec::new();
    for run in cleaned.split(|c: char| !c.is_alphanumeric()) {
        split_run(run, &mut words);
    }
    words.join("-")
}

fn split_run(run: &str, words: &mut Vec<String>) {
    let chars: Vec<char> = run.chars().collect();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if let Some(&prev) = i.checked_sub(1).and_then(|p| chars.get(p)) {
            let next = chars.get(i + 1).copied();
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_uppercase()
                    && c.is_uppercase()
                    && next.map(char::is_lowercase).unwrap_or(false))
                || (prev.is_alphabetic() && c.is_numeric())
                || (prev.is_numeric() && c.is_alphabetic());
            if boundary && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        }
        current.extend(c.to_lowercase());
    }

    if !current.is_empty() {
        words.push(current);
    }
}

/// One tag and the published records carrying it
#[derive(Debug, Clone, PartialEq)]
pub struct TagBucket {
    /// Normalized key, used in URLs
    pub key: String,
    /// Display casing of the first record that used the tag
    pub name: String,
    /// Indices into the record slice, newest first
    pub members: Vec<usize>,
}

/// Normalized tag key to its bucket, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    buckets: IndexMap<String, TagBucket>,
}

impl TagIndex {
    /// Add record `index` under every tag in `tags`. A record is added to
    /// a bucket once, however many of its tags normalize to the same key.
    pub(super) fn insert(&mut self, index: usize, tags: &[String]) {
        for tag in tags {
            let key = kebab_case(tag);
            if key.is_empty() {
                continue;
            }
            let bucket = self.buckets.entry(key.clone()).or_insert_with(|| TagBucket {
                key,
                name: tag.trim().to_string(),
                members: Vec::new(),
            });
            if !bucket.members.contains(&index) {
                bucket.members.push(index);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&TagBucket> {
        self.buckets.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagBucket> {
        self.buckets.values()
    }

    /// Buckets sorted by key
    pub fn sorted(&self) -> Vec<&TagBucket> {
        let mut buckets: Vec<_> = self.buckets.values().collect();
        buckets.sort_by(|a, b| a.key.cmp(&b.key));
        buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
