//! # blackcheck
//!
//! A conformance harness for BlackLab-style search services. It drives a
//! service through registering an input format, creating an index, ingesting
//! documents and querying, then checks each response against a golden fixture
//! once run-specific fields are stripped.
//!
//! Responses are decoded from JSON or XML into a [`Node`] tree, passed through
//! [`normalize`] with an [`IgnoreKeys`] set, and compared structurally with
//! [`diff::compare`].
//!
//! ```rust
//! use blackcheck::{decode::decode, normalize, IgnoreKeys};
//!
//! # fn main() -> Result<(), blackcheck::decode::DecodeError> {
//! let xml = decode(
//!     "<blacklabResponse><summary><searchTime>3</searchTime></summary><hits>\n</hits></blacklabResponse>",
//!     "application/xml",
//! )?;
//! let json = decode(r#"{"blacklabResponse": {"hits": []}}"#, "application/json")?;
//!
//! let ignore = IgnoreKeys::new(["blacklabResponse.summary"]);
//! assert_eq!(normalize(&xml, &ignore), normalize(&json, &ignore));
//! # Ok(())
//! # }
//! ```
//!
//! ## Running scenarios
//!
//! ```rust,no_run
//! use blackcheck::{scenario::catalog, HarnessConfig, ScenarioRunner};
//!
//! # async fn run() -> blackcheck::Result<()> {
//! let runner = ScenarioRunner::new(HarnessConfig::from_env()?)?;
//! for report in runner.run_all(&catalog::builtin(), false).await {
//!     println!("{}", report);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod decode;
pub mod diff;
pub mod error;
pub mod fixtures;
pub mod naming;
pub mod normalize;
pub mod scenario;
pub mod tree;

pub use config::HarnessConfig;
pub use error::{HarnessError, Mismatch, Result};
pub use naming::IndexHandle;
pub use normalize::{normalize, IgnoreKeys};
pub use scenario::{Scenario, ScenarioReport, ScenarioRunner, Step};
pub use tree::{Mapping, Node, Scalar};

pub use blackcheck_http as http;
