use blackcheck::decode::{decode, decode_as, ResponseFormat};
use blackcheck::diff::compare;
use blackcheck::fixtures::{self, Fixtures};
use blackcheck::scenario::{catalog, Expectation};
use blackcheck::{normalize, IgnoreKeys, Mapping, Node, Scalar};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

mod common;

fn random_scalar(rng: &mut StdRng) -> Node {
    match rng.gen_range(0..5) {
        0 => Node::Scalar(Scalar::Null),
        1 => Node::Scalar(Scalar::Bool(rng.gen())),
        2 => Node::Scalar(Scalar::Number(rng.gen_range(0u32..1000).into())),
        3 => Node::List(vec![Node::text(["", " ", "\n", "\t\n "][rng.gen_range(0..4)])]),
        _ => Node::text(format!("w{}", rng.gen_range(0..50))),
    }
}

const KEYS: &[&str] = &["summary", "hits", "docs", "pid", "searchTime", "left", "w"];

fn random_tree(rng: &mut StdRng, depth: u32) -> Node {
    if depth == 0 {
        return random_scalar(rng);
    }
    match rng.gen_range(0..3) {
        0 => random_scalar(rng),
        1 => {
            let len = rng.gen_range(0..4);
            Node::List((0..len).map(|_| random_tree(rng, depth - 1)).collect())
        }
        _ => {
            let mut map = Mapping::new();
            for _ in 0..rng.gen_range(0..5) {
                let key = KEYS[rng.gen_range(0..KEYS.len())];
                map.insert(key.to_string(), random_tree(rng, depth - 1));
            }
            Node::Map(map)
        }
    }
}

/// Whether `key` sits in the top-level mapping, looking through top-level lists.
fn top_level_has(node: &Node, key: &str) -> bool {
    match node {
        Node::Map(map) => map.contains_key(key),
        Node::List(items) => items.iter().any(|item| top_level_has(item, key)),
        Node::Scalar(_) => false,
    }
}

fn count_key(node: &Node, key: &str) -> usize {
    match node {
        Node::Map(map) => map
            .iter()
            .map(|(k, v)| usize::from(k == key) + count_key(v, key))
            .sum(),
        Node::List(items) => items.iter().map(|item| count_key(item, key)).sum(),
        Node::Scalar(_) => 0,
    }
}

/// Occurrences of `key` below the top level, not counting anything under the
/// top-level entries named in `dropped`.
fn nested_count(node: &Node, key: &str, dropped: &[&str]) -> usize {
    match node {
        Node::Map(map) => map
            .iter()
            .filter(|(k, _)| !dropped.contains(&k.as_str()))
            .map(|(_, v)| count_key(v, key))
            .sum(),
        Node::List(items) => items
            .iter()
            .map(|item| nested_count(item, key, dropped))
            .sum(),
        Node::Scalar(_) => 0,
    }
}

fn contains_blank_singleton(node: &Node) -> bool {
    node.is_blank_singleton()
        || match node {
            Node::Map(map) => map.values().any(contains_blank_singleton),
            Node::List(items) => items.iter().any(contains_blank_singleton),
            Node::Scalar(_) => false,
        }
}

#[test]
fn test_generated_trees_normalize_idempotently() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let ignore = IgnoreKeys::new(["summary", "searchTime"]);
    for _ in 0..500 {
        let tree = random_tree(&mut rng, 5);
        let once = normalize(&tree, &ignore);
        assert_eq!(normalize(&once, &ignore), once, "tree: {}", tree);
        assert!(!top_level_has(&once, "summary"));
        assert!(!top_level_has(&once, "searchTime"));
        let dropped = ["summary", "searchTime"];
        assert_eq!(
            nested_count(&once, "summary", &dropped),
            nested_count(&tree, "summary", &dropped)
        );
        assert!(!contains_blank_singleton(&once));
    }
}

#[test]
fn test_generated_trees_without_ignored_keys_only_lose_blanks() {
    let mut rng = StdRng::seed_from_u64(42);
    let ignore = IgnoreKeys::new(["notPresentAnywhere"]);
    for _ in 0..200 {
        let tree = random_tree(&mut rng, 4);
        if contains_blank_singleton(&tree) {
            continue;
        }
        assert_eq!(normalize(&tree, &ignore), tree);
    }
}

#[test]
fn test_empty_hits_agree_across_formats() {
    let xml = decode_as(&common::empty_query_result(), ResponseFormat::Xml).unwrap();
    let json = decode(
        r#"{"blacklabResponse": {"summary": {"searchTime": 9}, "hits": [], "docInfos": []}}"#,
        "application/json; charset=utf-8",
    )
    .unwrap();
    let ignore = IgnoreKeys::new(["blacklabResponse.summary"]);
    assert_eq!(normalize(&xml, &ignore), normalize(&json, &ignore));
}

#[test]
fn test_bundled_fixtures_are_stable_under_normalization() {
    let store = Fixtures::new(common::fixture_root());
    for scenario in catalog::builtin() {
        let Expectation::MatchesFixture { fixture, ignore, .. } = &scenario.expectation else {
            continue;
        };
        let tree = store.load_tree(fixture).unwrap();
        let once = normalize(&tree, ignore);
        assert_eq!(normalize(&once, ignore), once, "{}", scenario.name);
        for key in ignore.iter() {
            assert!(once.lookup(key).is_none(), "{}: {} kept", scenario.name, key);
        }
    }
}

#[test]
fn test_metadata_ignore_set_keeps_nested_display_names() {
    let store = Fixtures::new(common::fixture_root());
    let expected = store.load_tree(fixtures::EXPECTED_INDEX_METADATA).unwrap();
    let broken: serde_json::Value = serde_json::from_str(
        &common::fixture_text(fixtures::EXPECTED_INDEX_METADATA)
            .replace("\"Word\"", "\"BROKEN\"")
            .replace("\"Section\"", "\"BROKEN\""),
    )
    .unwrap();
    let ignore = IgnoreKeys::new(["indexName", "displayName", "versionInfo"]);

    let normalized = normalize(&expected, &ignore);
    assert!(normalized.get("displayName").is_none());
    assert_eq!(
        normalized
            .lookup("annotatedFields.contents.displayName")
            .and_then(Node::as_text),
        Some("Contents")
    );

    let mismatch = compare("index-metadata", &expected, &Node::from(broken), &ignore).unwrap_err();
    assert_eq!(mismatch.differences.len(), 2);
}

#[test]
fn test_live_query_result_matches_fixture_once_summary_is_ignored() {
    let store = Fixtures::new(common::fixture_root());
    let expected = store.load_tree(fixtures::EXPECTED_QUERY_RESULT).unwrap();
    let live = decode_as(&common::live_query_result(), ResponseFormat::Xml).unwrap();

    assert_ne!(expected, live);
    let ignore = IgnoreKeys::new(["blacklabResponse.summary"]);
    assert_eq!(normalize(&expected, &ignore), normalize(&live, &ignore));
}

#[test]
fn test_hit_context_words_keep_their_order() {
    let store = Fixtures::new(common::fixture_root());
    let tree = normalize(
        &store.load_tree(fixtures::EXPECTED_QUERY_RESULT).unwrap(),
        &IgnoreKeys::default(),
    );
    let words: Vec<&str> = tree
        .lookup("blacklabResponse.hits.hit.left.w")
        .and_then(Node::as_list)
        .unwrap()
        .iter()
        .filter_map(Node::as_text)
        .collect();
    assert_eq!(words, vec!["for", "an", "initial", "term", "of"]);
}
