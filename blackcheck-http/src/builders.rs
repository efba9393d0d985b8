//! One builder per service operation.
//!
//! Builders only map arguments to a [`Request`]; transmission and any
//! interpretation of the result happen elsewhere.

use crate::request::{Method, Request, ResponseFormat};

/// Multipart field name the service reads uploads from.
pub const UPLOAD_FIELD: &str = "data";
/// File name used for document uploads.
pub const DOCUMENTS_FILE_NAME: &str = "testdocs";

/// Optional result-window controls appended to query calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub window_size: Option<u32>,
    pub words_around_hit: Option<u32>,
}

/// Index identity as the service addresses it.
pub fn index_id(owner: &str, name: &str) -> String {
    format!("{}:{}", owner, name)
}

/// `GET /`: server information, used as a liveness preflight.
pub fn server_info() -> Request {
    Request::new(Method::Get, "/")
}

/// `POST /input-formats`. The service derives the format name from `file_name`.
pub fn register_format(format_bytes: Vec<u8>, file_name: &str) -> Request {
    Request::new(Method::Post, "/input-formats").upload(UPLOAD_FIELD, file_name, format_bytes)
}

/// `POST /?name=owner:name&display=..&format=..`
pub fn create_index(owner: &str, name: &str, display_name: &str, format_id: &str) -> Request {
    Request::new(Method::Post, "/")
        .query("name", index_id(owner, name))
        .query("display", display_name)
        .query("format", format_id)
}

pub fn fetch_index_status(index_id: &str) -> Request {
    Request::new(Method::Get, format!("/{}/status", index_id))
}

pub fn fetch_index_metadata(index_id: &str) -> Request {
    Request::new(Method::Get, format!("/{}/", index_id))
}

pub fn fetch_index_content(index_id: &str) -> Request {
    Request::new(Method::Get, format!("/{}/docs", index_id))
}

pub fn ingest_documents(index_id: &str, payload: Vec<u8>) -> Request {
    Request::new(Method::Post, format!("/{}/docs", index_id)).upload(
        UPLOAD_FIELD,
        DOCUMENTS_FILE_NAME,
        payload,
    )
}

pub fn delete_index(index_id: &str) -> Request {
    Request::new(Method::Delete, format!("/{}", index_id))
}

/// `POST /{index}/hits/?patt=..[&filter=..]`
///
/// `filter: None` leaves the parameter out entirely; `Some("")` sends it
/// with an empty value. The service treats the two differently.
pub fn run_query(
    index_id: &str,
    pattern: &str,
    filter: Option<&str>,
    accept: ResponseFormat,
    options: QueryOptions,
) -> Request {
    let mut req = Request::new(Method::Post, format!("/{}/hits/", index_id))
        .accept(accept)
        .query("patt", pattern);
    if let Some(filter) = filter {
        req = req.query("filter", filter);
    }
    if let Some(number) = options.window_size {
        req = req.query("number", number.to_string());
    }
    if let Some(words) = options.words_around_hit {
        req = req.query("wordsaroundhit", words.to_string());
    }
    req
}
