//! View counting
//!
//! Pages show how often they were viewed. The counter lives outside the
//! build: pages only know the key they are counted under, and a counter
//! that fails never keeps a page from rendering.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::content::ContentRecord;

#[derive(thiserror::Error, Debug)]
pub enum ViewCountError {
    #[error("view counter unavailable: {0}")]
    Unavailable(String),

    #[error("invalid view key '{0}'")]
    InvalidKey(String),
}

/// An increment-and-read counter keyed by canonical path
pub trait ViewCounter: Send + Sync {
    /// Count one view of `key` and return the new total
    fn get_and_increment(&self, key: &str) -> Result<u64, ViewCountError>;
}

/// In-process counter; every increment is applied exactly once
#[derive(Debug, Default)]
pub struct MemoryViewCounter {
    counts: Mutex<HashMap<String, u64>>,
}

impl MemoryViewCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current count without incrementing
    pub fn get(&self, key: &str) -> u64 {
        self.counts
            .lock()
            .map(|counts| counts.get(key).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

impl ViewCounter for MemoryViewCounter {
    fn get_and_increment(&self, key: &str) -> Result<u64, ViewCountError> {
        if !key.starts_with('/') {
            return Err(ViewCountError::InvalidKey(key.to_string()));
        }
        let mut counts = self
            .counts
            .lock()
            .map_err(|e| ViewCountError::Unavailable(e.to_string()))?;
        let count = counts.entry(key.to_string()).or_insert(0);
        *count += 1;
        Ok(*count)
    }
}

/// The key a record is counted under: its canonical path on this site
pub fn view_key(record: &ContentRecord) -> &str {
    &record.slug
}

/// Count a view, turning any failure into "no count to show"
pub fn display_count(counter: &dyn ViewCounter, key: &str) -> Option<u64> {
    match counter.get_and_increment(key) {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!("Could not count view of {}: {}", key, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    struct BrokenCounter;

    impl ViewCounter for BrokenCounter {
        fn get_and_increment(&self, _key: &str) -> Result<u64, ViewCountError> {
            Err(ViewCountError::Unavailable("offline".to_string()))
        }
    }

    #[test]
    fn test_increments() {
        let counter = MemoryViewCounter::new();
        assert_eq!(counter.get_and_increment("/a/").unwrap(), 1);
        assert_eq!(counter.get_and_increment("/a/").unwrap(), 2);
        assert_eq!(counter.get_and_increment("/b/").unwrap(), 1);
        assert_eq!(counter.get("/a/"), 2);
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let counter = Arc::new(MemoryViewCounter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    let mut seen = Vec::new();
                    for _ in 0..250 {
                        seen.push(counter.get_and_increment("/post/").unwrap());
                    }
                    seen
                })
            })
            .collect();

        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();

        assert_eq!(counter.get("/post/"), 2000);
        // Every count handed out exactly once
        assert_eq!(all, (1..=2000).collect::<Vec<u64>>());
    }

    #[test]
    fn test_failure_becomes_none() {
        assert_eq!(display_count(&BrokenCounter, "/a/"), None);
        let counter = MemoryViewCounter::new();
        assert_eq!(display_count(&counter, "/a/"), Some(1));
        assert_eq!(display_count(&counter, "no-slash"), None);
    }

    #[test]
    fn test_view_key_is_slug() {
        let record = ContentRecord::fixture("hello", "2020-01-01", 0);
        assert_eq!(view_key(&record), "/hello/");
    }
}
