//! Read-only fixture files under a configurable root.

use crate::decode::{self, DecodeError, ResponseFormat, XmlOptions};
use crate::error::{HarnessError, Result};
use crate::tree::Node;
use std::path::{Path, PathBuf};

/// Ingestion format descriptor. The service names the format after the
/// file stem, so it registers as `<owner>:test-input-format`.
pub const INPUT_FORMAT_FILE: &str = "test-input-format.blf.yml";
pub const INPUT_FORMAT_NAME: &str = "test-input-format";
pub const DOCUMENTS_FILE: &str = "documents-to-index.xml";
pub const EXPECTED_INDEX_CONTENT: &str = "expected-index-content.json";
pub const EXPECTED_INDEX_METADATA: &str = "expected-index-metadata.json";
pub const EXPECTED_QUERY_RESULT: &str = "expected-query-result.xml";

#[derive(Debug, Clone)]
pub struct Fixtures {
    root: PathBuf,
}

impl Fixtures {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn read_bytes(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path(name);
        std::fs::read(&path).map_err(|source| HarnessError::Fixture { path, source })
    }

    /// Load and decode a golden file, picking the decoder by extension.
    pub fn load_tree(&self, name: &str) -> Result<Node> {
        self.load_tree_with(name, XmlOptions::default())
    }

    pub fn load_tree_with(&self, name: &str, options: XmlOptions) -> Result<Node> {
        load_tree_file_with(&self.path(name), options)
    }

    /// Names of the files every scenario run depends on that are missing.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            INPUT_FORMAT_FILE,
            DOCUMENTS_FILE,
            EXPECTED_INDEX_CONTENT,
            EXPECTED_INDEX_METADATA,
            EXPECTED_QUERY_RESULT,
        ]
        .into_iter()
        .filter(|name| !self.path(name).is_file())
        .collect()
    }
}

/// Decode a JSON or XML file by its extension.
pub fn load_tree_file_with(path: &Path, options: XmlOptions) -> Result<Node> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let format = ResponseFormat::from_extension(ext).ok_or_else(|| {
        HarnessError::Decode(DecodeError::UnsupportedContentType(format!(
            "file extension '{}' of {}",
            ext,
            path.display()
        )))
    })?;
    let text = std::fs::read_to_string(path).map_err(|source| HarnessError::Fixture {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decode::decode_with(&text, format, options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_load_tree_by_extension() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.json"), r#"{"hits": []}"#).unwrap();
        std::fs::write(dir.path().join("b.xml"), "<r><hits>\n</hits></r>").unwrap();

        let fixtures = Fixtures::new(dir.path());
        assert_eq!(fixtures.load_tree("a.json").unwrap().to_json(), json!({"hits": []}));
        assert_eq!(
            fixtures.load_tree("b.xml").unwrap().to_json(),
            json!({"r": {"hits": ["\n"]}})
        );
    }

    #[test]
    fn test_load_tree_with_attributes() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("d.xml"), r#"<r><doc pid="7"/></r>"#).unwrap();

        let fixtures = Fixtures::new(dir.path());
        assert_eq!(fixtures.load_tree("d.xml").unwrap().to_json(), json!({"r": {"doc": [""]}}));
        assert_eq!(
            fixtures
                .load_tree_with("d.xml", XmlOptions { attributes: true })
                .unwrap()
                .to_json(),
            json!({"r": {"doc": {"@pid": "7"}}})
        );
    }

    #[test]
    fn test_missing_file_is_a_fixture_error() {
        let dir = TempDir::new().unwrap();
        let err = Fixtures::new(dir.path()).read_bytes("nope.yml").unwrap_err();
        match err {
            HarnessError::Fixture { path, source } => {
                assert!(path.ends_with("nope.yml"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected fixture error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.yml"), "x: 1").unwrap();
        let err = Fixtures::new(dir.path()).load_tree("a.yml").unwrap_err();
        assert_eq!(err.kind(), "decode_error");
    }

    #[test]
    fn test_malformed_fixture_is_a_decode_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.json"), "{").unwrap();
        let err = Fixtures::new(dir.path()).load_tree("a.json").unwrap_err();
        assert!(matches!(err, HarnessError::Decode(DecodeError::Json { .. })));
    }

    #[test]
    fn test_bundled_fixtures_are_complete() {
        let fixtures = Fixtures::new(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures"));
        assert!(fixtures.missing().is_empty(), "missing: {:?}", fixtures.missing());
        for name in [EXPECTED_INDEX_CONTENT, EXPECTED_INDEX_METADATA, EXPECTED_QUERY_RESULT] {
            fixtures.load_tree(name).unwrap();
        }
    }
}
