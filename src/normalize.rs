//! Comparison-ready trees: volatile keys removed, empty collections unified.

use crate::tree::{Mapping, Node};
use std::collections::BTreeSet;

/// Keys whose values vary between runs and are left out of comparisons.
///
/// A plain entry (`summary`) matches that key in the top-level mapping only;
/// a nested key of the same name is kept and compared. A dotted entry
/// (`blacklabResponse.summary`) matches only at that path from the root. List
/// elements do not add path segments. Entries that never match are harmless.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreKeys {
    top_level: BTreeSet<String>,
    paths: BTreeSet<String>,
}

impl IgnoreKeys {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for key in keys {
            set.insert(key);
        }
        set
    }

    pub fn insert(&mut self, key: impl Into<String>) {
        let key = key.into();
        if key.contains('.') {
            self.paths.insert(key);
        } else {
            self.top_level.insert(key);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top_level.is_empty() && self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.top_level.iter().chain(self.paths.iter()).map(String::as_str)
    }

    fn matches(&self, path: &[&str], key: &str) -> bool {
        if path.is_empty() {
            return self.top_level.contains(key);
        }
        if self.paths.is_empty() {
            return false;
        }
        let mut full = path.join(".");
        full.push('.');
        full.push_str(key);
        self.paths.contains(&full)
    }
}

impl<S: Into<String>> FromIterator<S> for IgnoreKeys {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Produce a new tree without the ignored keys and with every blank
/// single-element list (`[""]`, `["\n"]`) replaced by an empty list.
///
/// Total and idempotent: `normalize(&normalize(t, k), k) == normalize(t, k)`.
/// List order is kept.
pub fn normalize(tree: &Node, ignore: &IgnoreKeys) -> Node {
    let mut path = Vec::new();
    normalize_at(tree, ignore, &mut path)
}

fn normalize_at<'a>(node: &'a Node, ignore: &IgnoreKeys, path: &mut Vec<&'a str>) -> Node {
    match node {
        Node::Scalar(_) => node.clone(),
        Node::List(_) if node.is_blank_singleton() => Node::empty_list(),
        Node::List(items) => Node::List(
            items
                .iter()
                .map(|item| normalize_at(item, ignore, path))
                .collect(),
        ),
        Node::Map(map) => {
            let mut out = Mapping::with_capacity(map.len());
            for (key, value) in map {
                if ignore.matches(path, key) {
                    continue;
                }
                path.push(key);
                let value = normalize_at(value, ignore, path);
                path.pop();
                out.insert(key.clone(), value);
            }
            Node::Map(out)
        }
    }
}
