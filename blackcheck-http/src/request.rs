use serde::{Deserialize, Serialize};
use std::fmt;

pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_XML: &str = "application/xml";

/// Response body formats the service can be asked for via `Accept`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    Json,
    Xml,
}

impl ResponseFormat {
    pub fn mime(self) -> &'static str {
        match self {
            ResponseFormat::Json => APPLICATION_JSON,
            ResponseFormat::Xml => APPLICATION_XML,
        }
    }

    /// Map a `Content-Type` header value to a format.
    ///
    /// Parameters such as `charset` are ignored. `text/xml` and `+json`/`+xml`
    /// suffix types are accepted.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "application/json" | "text/json" => Some(ResponseFormat::Json),
            "application/xml" | "text/xml" => Some(ResponseFormat::Xml),
            other if other.ends_with("+json") => Some(ResponseFormat::Json),
            other if other.ends_with("+xml") => Some(ResponseFormat::Xml),
            _ => None,
        }
    }

    /// Map a fixture file extension (`json`, `xml`) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(ResponseFormat::Json),
            "xml" => Some(ResponseFormat::Xml),
            _ => None,
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file attached to a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Empty,
    Multipart(Upload),
}

/// A fully-formed call against the service, relative to the base URL.
///
/// Query parameters keep insertion order; a parameter that is absent is simply
/// not in the list, which is distinct from a parameter with an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub accept: ResponseFormat,
    pub body: Body,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            accept: ResponseFormat::Json,
            body: Body::Empty,
        }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn accept(mut self, format: ResponseFormat) -> Self {
        self.accept = format;
        self
    }

    pub fn upload(mut self, field: &str, file_name: &str, bytes: Vec<u8>) -> Self {
        self.body = Body::Multipart(Upload {
            field: field.to_string(),
            file_name: file_name.to_string(),
            bytes,
        });
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw outcome of one call. `ok` mirrors a 2xx status.
#[derive(Debug, Clone)]
pub struct Response {
    pub ok: bool,
    pub status: u16,
    pub content_type: Option<String>,
    pub body_text: String,
    pub request_id: String,
}

impl Response {
    /// Format declared by the `Content-Type` header, if recognizable.
    pub fn format(&self) -> Option<ResponseFormat> {
        self.content_type
            .as_deref()
            .and_then(ResponseFormat::from_content_type)
    }
}
