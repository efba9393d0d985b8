//! # blackcheck-http
//!
//! Transport client and request builders for a BlackLab-style search service.
//!
//! ```rust,no_run
//! use blackcheck_http::{BlackLabClient, Credentials, ResponseFormat, QueryOptions};
//! use std::time::Duration;
//!
//! # async fn run() -> blackcheck_http::Result<()> {
//! let client = BlackLabClient::new(
//!     "http://localhost:8080/blacklab-server",
//!     Credentials::new("user", "secret"),
//!     Duration::from_secs(180),
//! )?;
//! let resp = client
//!     .run_query("user:my-index", "\"120\"", None, ResponseFormat::Xml, QueryOptions::default())
//!     .await?;
//! assert!(resp.ok);
//! # Ok(())
//! # }
//! ```

pub mod builders;
pub mod client;
pub mod error;
pub mod request;

pub use builders::{index_id, QueryOptions};
pub use client::{BlackLabClient, Credentials, REQUEST_ID_HEADER};
pub use error::{Result, TransportError};
pub use request::{
    Body, Method, Request, Response, ResponseFormat, Upload, APPLICATION_JSON, APPLICATION_XML,
};
