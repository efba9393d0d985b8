//! The decoded form of a JSON or XML response body.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Mapping entries keep document order for display; equality ignores order.
pub type Mapping = IndexMap<String, Node>;

/// A leaf value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

/// A decoded response tree: a scalar, an ordered list, or a keyed mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Scalar(Scalar),
    List(Vec<Node>),
    Map(Mapping),
}

impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Node::Scalar(Scalar::Text(s.into()))
    }

    pub fn empty_list() -> Self {
        Node::List(Vec::new())
    }

    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Node::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Entry for `key` when this node is a mapping.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Follow a dotted path of mapping keys, e.g. `blacklabResponse.hits`.
    ///
    /// An empty path returns `self`.
    pub fn lookup(&self, path: &str) -> Option<&Node> {
        if path.is_empty() {
            return Some(self);
        }
        path.split('.').try_fold(self, |node, key| node.get(key))
    }

    /// `[""]`, `["\n  "]` and the like: how XML spells an element with no
    /// children.
    pub fn is_blank_singleton(&self) -> bool {
        match self {
            Node::List(items) if items.len() == 1 => items[0]
                .as_text()
                .map(|s| s.trim().is_empty())
                .unwrap_or(false),
            _ => false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Node::Scalar(Scalar::Null) => "null",
            Node::Scalar(Scalar::Bool(_)) => "boolean",
            Node::Scalar(Scalar::Number(_)) => "number",
            Node::Scalar(Scalar::Text(_)) => "string",
            Node::List(_) => "list",
            Node::Map(_) => "mapping",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Node::Scalar(Scalar::Null) => serde_json::Value::Null,
            Node::Scalar(Scalar::Bool(b)) => serde_json::Value::Bool(*b),
            Node::Scalar(Scalar::Number(n)) => serde_json::Value::Number(n.clone()),
            Node::Scalar(Scalar::Text(s)) => serde_json::Value::String(s.clone()),
            Node::List(items) => serde_json::Value::Array(items.iter().map(Node::to_json).collect()),
            Node::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Node {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Node::Scalar(Scalar::Null),
            serde_json::Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
            serde_json::Value::Number(n) => Node::Scalar(Scalar::Number(n)),
            serde_json::Value::String(s) => Node::Scalar(Scalar::Text(s)),
            serde_json::Value::Array(items) => Node::List(items.into_iter().map(Node::from).collect()),
            serde_json::Value::Object(map) => {
                Node::Map(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_preserves_shape() {
        let node = Node::from(json!({
            "summary": {"searchTime": 12},
            "hits": [{"docPid": "0"}],
            "flag": true,
            "missing": null
        }));

        assert_eq!(node.kind(), "mapping");
        assert_eq!(node.lookup("summary.searchTime").map(Node::kind), Some("number"));
        assert_eq!(node.get("hits").and_then(Node::as_list).map(<[Node]>::len), Some(1));
        assert_eq!(node.get("flag"), Some(&Node::Scalar(Scalar::Bool(true))));
        assert_eq!(node.get("missing"), Some(&Node::Scalar(Scalar::Null)));
    }

    #[test]
    fn test_mapping_equality_ignores_key_order() {
        let a = Node::from(json!({"a": 1, "b": 2}));
        let b = Node::from(json!({"b": 2, "a": 1}));
        assert_eq!(a, b);
    }

    #[test]
    fn test_list_equality_respects_order() {
        assert_ne!(Node::from(json!([1, 2])), Node::from(json!([2, 1])));
    }

    #[test]
    fn test_lookup_through_non_mapping_fails() {
        let node = Node::from(json!({"hits": [{"docPid": "0"}]}));
        assert!(node.lookup("hits.docPid").is_none());
        assert_eq!(node.lookup(""), Some(&node));
    }

    #[test]
    fn test_blank_singleton_detection() {
        assert!(Node::List(vec![Node::text("\n  ")]).is_blank_singleton());
        assert!(Node::List(vec![Node::text("")]).is_blank_singleton());
        assert!(!Node::List(vec![Node::text("x")]).is_blank_singleton());
        assert!(!Node::List(vec![Node::text(" "), Node::text(" ")]).is_blank_singleton());
        assert!(!Node::text(" ").is_blank_singleton());
        assert!(!Node::empty_list().is_blank_singleton());
    }

    #[test]
    fn test_serialize_matches_json_form() {
        let value = json!({"a": [1, "x", null, false], "b": {}});
        let node = Node::from(value.clone());
        assert_eq!(serde_json::to_value(&node).unwrap(), value);
        assert_eq!(node.to_json(), value);
    }
}
