//! Structural differences between two trees.
//!
//! Paths read like `blacklabResponse.hits.hit[0].docPid`; the root is `$`.

use crate::error::Mismatch;
use crate::normalize::{normalize, IgnoreKeys};
use crate::tree::Node;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    /// Key present in the expected mapping only.
    Missing,
    /// Key present in the actual mapping only.
    Unexpected,
    /// Different node kinds (e.g. list vs mapping).
    Type,
    /// Same scalar kind, different value.
    Value,
    /// Lists of different length; common elements are compared too.
    Length,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Difference {
    pub path: String,
    pub kind: DiffKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<serde_json::Value>,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<serde_json::Value>| match v {
            Some(v) => truncate(&v.to_string(), 120),
            None => "<absent>".to_string(),
        };
        match self.kind {
            DiffKind::Missing => write!(f, "{}: missing, expected {}", self.path, show(&self.expected)),
            DiffKind::Unexpected => write!(f, "{}: unexpected {}", self.path, show(&self.actual)),
            DiffKind::Type | DiffKind::Value | DiffKind::Length => write!(
                f,
                "{}: {:?} mismatch, expected {} got {}",
                self.path,
                self.kind,
                show(&self.expected),
                show(&self.actual)
            ),
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{}...", cut)
    }
}

/// Every structural difference between `expected` and `actual`, in document
/// order of `expected`. Empty when the trees are equal.
pub fn diff(expected: &Node, actual: &Node) -> Vec<Difference> {
    let mut out = Vec::new();
    walk("$".to_string(), expected, actual, &mut out);
    out
}

/// Normalize both trees with `ignore` and require them to be equal.
///
/// `subject` names the compared document in the resulting [`Mismatch`].
pub fn compare(
    subject: &str,
    expected: &Node,
    actual: &Node,
    ignore: &IgnoreKeys,
) -> Result<(), Mismatch> {
    let expected = normalize(expected, ignore);
    let actual = normalize(actual, ignore);
    if expected == actual {
        return Ok(());
    }
    Err(Mismatch {
        subject: subject.to_string(),
        differences: diff(&expected, &actual),
    })
}

fn walk(path: String, expected: &Node, actual: &Node, out: &mut Vec<Difference>) {
    match (expected, actual) {
        (Node::Map(e), Node::Map(a)) => {
            for (key, ev) in e {
                let child = child_path(&path, key);
                match a.get(key) {
                    Some(av) => walk(child, ev, av, out),
                    None => out.push(Difference {
                        path: child,
                        kind: DiffKind::Missing,
                        expected: Some(ev.to_json()),
                        actual: None,
                    }),
                }
            }
            for (key, av) in a {
                if !e.contains_key(key) {
                    out.push(Difference {
                        path: child_path(&path, key),
                        kind: DiffKind::Unexpected,
                        expected: None,
                        actual: Some(av.to_json()),
                    });
                }
            }
        }
        (Node::List(e), Node::List(a)) => {
            if e.len() != a.len() {
                out.push(Difference {
                    path: path.clone(),
                    kind: DiffKind::Length,
                    expected: Some(e.len().into()),
                    actual: Some(a.len().into()),
                });
            }
            for (i, (ev, av)) in e.iter().zip(a.iter()).enumerate() {
                walk(format!("{}[{}]", path, i), ev, av, out);
            }
        }
        (Node::Scalar(e), Node::Scalar(a)) => {
            if e != a {
                let kind = if expected.kind() == actual.kind() {
                    DiffKind::Value
                } else {
                    DiffKind::Type
                };
                out.push(Difference {
                    path,
                    kind,
                    expected: Some(expected.to_json()),
                    actual: Some(actual.to_json()),
                });
            }
        }
        _ => out.push(Difference {
            path,
            kind: DiffKind::Type,
            expected: Some(expected.to_json()),
            actual: Some(actual.to_json()),
        }),
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent == "$" {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}
