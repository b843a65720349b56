//! Page graph - navigation order per collection and the tag index
//!
//! The graph refers to records by their index in the slice it was built
//! from, so it can be kept next to that slice without borrowing it.

mod tags;

pub use tags::{kebab_case, TagBucket, TagIndex};

use std::collections::BTreeMap;

use crate::config::SiteConfig;
use crate::content::{Collection, ContentRecord};
use crate::helpers::site_path;

/// Neighbors of a record in its collection's date-descending order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationLink {
    /// The next older record
    pub previous: Option<usize>,
    /// The next newer record
    pub next: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct PageGraph {
    ordered: BTreeMap<Collection, Vec<usize>>,
    links: Vec<NavigationLink>,
    tags: TagIndex,
}

impl PageGraph {
    /// Order every collection newest first (load order breaks ties), link
    /// neighbors and index tags. Unpublished records take part in neither.
    pub fn build<T: AsRef<ContentRecord>>(records: &[T]) -> Self {
        let mut ordered: BTreeMap<Collection, Vec<usize>> = BTreeMap::new();
        for (index, record) in records.iter().enumerate() {
            let record = record.as_ref();
            if record.published {
                ordered.entry(record.collection).or_default().push(index);
            }
        }

        let mut links = vec![NavigationLink::default(); records.len()];
        let mut tags = TagIndex::default();

        for indices in ordered.values_mut() {
            indices.sort_by(|&a, &b| {
                let (a, b) = (records[a].as_ref(), records[b].as_ref());
                b.date.cmp(&a.date).then(a.order.cmp(&b.order))
            });

            for (position, &index) in indices.iter().enumerate() {
                links[index] = NavigationLink {
                    previous: indices.get(position + 1).copied(),
                    next: position.checked_sub(1).map(|p| indices[p]),
                };
            }
        }

        // Newest first across collections, so every bucket lists its
        // members in publish-date order
        let mut by_date: Vec<usize> = ordered.values().flatten().copied().collect();
        by_date.sort_by(|&a, &b| {
            let (a, b) = (records[a].as_ref(), records[b].as_ref());
            b.date.cmp(&a.date).then(a.order.cmp(&b.order))
        });
        for index in by_date {
            tags.insert(index, &records[index].as_ref().tags);
        }

        Self {
            ordered,
            links,
            tags,
        }
    }

    /// Published records of `collection`, newest first
    pub fn ordered(&self, collection: Collection) -> &[usize] {
        self.ordered
            .get(&collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn navigation(&self, index: usize) -> NavigationLink {
        self.links.get(index).copied().unwrap_or_default()
    }

    pub fn tags(&self) -> &TagIndex {
        &self.tags
    }
}

/// Site path of a tag page, e.g. `/tags/java-script/`
pub fn tag_path(config: &SiteConfig, tag: &str) -> String {
    site_path(&[&config.tag_dir, &kebab_case(tag)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(id: &str, date: &str, order: usize, tags: &[&str]) -> ContentRecord {
        let mut record = ContentRecord::fixture(id, date, order);
        record.tags = tags.iter().map(|t| t.to_string()).collect();
        record
    }

    #[test]
    fn test_navigation_chain() {
        let records = vec![
            ContentRecord::fixture("b", "2020-02-01", 0),
            ContentRecord::fixture("a", "2020-01-01", 1),
            ContentRecord::fixture("c", "2020-03-01", 2),
            ContentRecord::fixture("d", "2020-04-01", 3),
        ];
        let graph = PageGraph::build(&records);
        let order = graph.ordered(Collection::Post);
        assert_eq!(order, &[3, 2, 0, 1]);

        // Newest has no next, oldest no previous
        assert_eq!(graph.navigation(3).next, None);
        assert_eq!(graph.navigation(1).previous, None);

        for &index in order {
            let link = graph.navigation(index);
            if let Some(prev) = link.previous {
                assert_eq!(graph.navigation(prev).next, Some(index));
                assert!(records[prev].date <= records[index].date);
            }
            if let Some(next) = link.next {
                assert_eq!(graph.navigation(next).previous, Some(index));
            }
        }
    }

    #[test]
    fn test_same_date_uses_load_order() {
        let records = vec![
            ContentRecord::fixture("first", "2020-01-01", 0),
            ContentRecord::fixture("second", "2020-01-01", 1),
        ];
        let graph = PageGraph::build(&records);
        assert_eq!(graph.ordered(Collection::Post), &[0, 1]);
    }

    #[test]
    fn test_collections_are_linked_separately() {
        let mut issue = ContentRecord::fixture("issue", "2020-06-01", 1);
        issue.collection = Collection::NewsletterIssue;
        let records = vec![ContentRecord::fixture("post", "2020-01-01", 0), issue];

        let graph = PageGraph::build(&records);
        assert_eq!(graph.navigation(0), NavigationLink::default());
        assert_eq!(graph.navigation(1), NavigationLink::default());
        assert_eq!(graph.ordered(Collection::NewsletterIssue), &[1]);
    }

    #[test]
    fn test_unpublished_excluded() {
        let mut draft = tagged("draft", "2020-03-01", 1, &["Rust"]);
        draft.published = false;
        let records = vec![
            tagged("old", "2020-01-01", 0, &["Rust"]),
            draft,
            tagged("new", "2020-05-01", 2, &["Go"]),
        ];
        let graph = PageGraph::build(&records);

        assert_eq!(graph.ordered(Collection::Post), &[2, 0]);
        assert_eq!(graph.navigation(0).next, Some(2));
        assert_eq!(graph.navigation(1), NavigationLink::default());
        for bucket in graph.tags().iter() {
            assert!(!bucket.members.contains(&1));
        }
    }

    #[test]
    fn test_tag_membership() {
        let records = vec![
            tagged("a", "2020-01-01", 0, &["React", "JavaScript"]),
            tagged("b", "2020-02-01", 1, &["javaScript"]),
            tagged("c", "2020-03-01", 2, &[]),
        ];
        let graph = PageGraph::build(&records);
        let tags = graph.tags();

        for bucket in tags.iter() {
            let expected: Vec<usize> = records
                .iter()
                .enumerate()
                .filter(|(_, r)| r.tags.iter().any(|t| kebab_case(t) == bucket.key))
                .map(|(i, _)| i)
                .collect();
            let mut members = bucket.members.clone();
            members.sort();
            assert_eq!(members, expected, "bucket {}", bucket.key);
        }

        // Newest first within a bucket
        assert_eq!(tags.get("java-script").unwrap().members, vec![1, 0]);
        assert_eq!(tags.get("java-script").unwrap().name, "javaScript");
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_tag_path() {
        let config = SiteConfig::default();
        assert_eq!(tag_path(&config, "Ruby on Rails"), "/tags/ruby-on-rails/");
    }
}
