//! Response body decoding into [`Node`] trees.
//!
//! JSON maps one-to-one. XML is folded into the same shape:
//!
//! - an element with child elements becomes a mapping keyed by child name;
//!   children sharing a name under one parent become a list, in order
//! - an element with only non-blank text becomes a trimmed text scalar
//! - an element with no child elements and blank (or no) text becomes a
//!   one-element list holding that blank text, which
//!   [`normalize`](crate::normalize::normalize) turns into an empty list
//! - attributes are dropped unless [`XmlOptions::attributes`] is set
//! - text mixed in between child elements is dropped
//!
//! The document root is kept as the single key of the top-level mapping, so a
//! BlackLab XML response decodes to `{"blacklabResponse": {...}}`.

mod json;
mod xml;

pub use blackcheck_http::ResponseFormat;
pub use xml::XmlOptions;

use crate::tree::Node;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Empty {0} document")]
    EmptyDocument(ResponseFormat),

    #[error("JSON error at line {line}, column {column}: {message}")]
    Json {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("XML error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("Unbalanced XML: {0}")]
    UnbalancedXml(String),
}

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Decode `body` according to a `Content-Type` header value.
pub fn decode(body: &str, content_type: &str) -> Result<Node> {
    let format = ResponseFormat::from_content_type(content_type)
        .ok_or_else(|| DecodeError::UnsupportedContentType(content_type.to_string()))?;
    decode_as(body, format)
}

/// Decode `body` as `format`, with default XML options.
pub fn decode_as(body: &str, format: ResponseFormat) -> Result<Node> {
    decode_with(body, format, XmlOptions::default())
}

/// Decode `body` as `format`. `options` only affect XML.
pub fn decode_with(body: &str, format: ResponseFormat, options: XmlOptions) -> Result<Node> {
    match format {
        ResponseFormat::Json => json::decode(body),
        ResponseFormat::Xml => xml::decode(body, options),
    }
}
