use super::{DecodeError, ResponseFormat, Result};
use crate::tree::Node;

pub(super) fn decode(body: &str) -> Result<Node> {
    if body.trim().is_empty() {
        return Err(DecodeError::EmptyDocument(ResponseFormat::Json));
    }
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| DecodeError::Json {
        line: e.line(),
        column: e.column(),
        message: e.to_string(),
    })?;
    Ok(Node::from(value))
}
