//! End-to-end scenarios against a live service.
//!
//! Each scenario walks `SETUP -> CREATE_INDEX -> INGEST -> ACT -> ASSERT -> DONE`
//! on a freshly minted index. The first failing step ends the scenario; there
//! are no retries.

pub mod catalog;
mod runner;

pub use runner::ScenarioRunner;

use crate::error::HarnessError;
use crate::naming::IndexHandle;
use crate::normalize::IgnoreKeys;
use blackcheck_http::ResponseFormat;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Step {
    Setup,
    CreateIndex,
    Ingest,
    Act,
    Assert,
    Done,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Step::Setup => "SETUP",
            Step::CreateIndex => "CREATE_INDEX",
            Step::Ingest => "INGEST",
            Step::Act => "ACT",
            Step::Assert => "ASSERT",
            Step::Done => "DONE",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub pattern: String,
    /// `None` omits the filter parameter; `Some("")` sends it empty.
    pub filter: Option<String>,
    pub format: ResponseFormat,
}

/// The call whose response is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Status,
    Content,
    Metadata,
    Query(QuerySpec),
}

impl Action {
    /// Format requested via `Accept`, used when the response has no
    /// `Content-Type`.
    pub fn format(&self) -> ResponseFormat {
        match self {
            Action::Query(q) => q.format,
            _ => ResponseFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// A 2xx response is enough.
    Success,
    /// Normalized response equals the normalized fixture. With
    /// `xml_attributes`, XML attributes on both sides take part.
    MatchesFixture {
        fixture: String,
        ignore: IgnoreKeys,
        xml_attributes: bool,
    },
    /// After normalization, the node at this dotted path is an empty list.
    EmptyList { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub ingest: bool,
    pub action: Action,
    pub expectation: Expectation,
}

/// Terminal failure of a scenario, tagged with the step it happened in.
#[derive(Error, Debug)]
#[error("{step} failed: {error}")]
pub struct ScenarioFailure {
    pub step: Step,
    #[source]
    pub error: HarnessError,
}

#[derive(Debug)]
pub struct ScenarioReport {
    pub scenario: String,
    pub index: IndexHandle,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub outcome: Result<(), ScenarioFailure>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut report = serde_json::json!({
            "scenario": self.scenario,
            "index": self.index.id(),
            "started_at": self.started_at.to_rfc3339(),
            "elapsed_ms": self.elapsed.as_millis() as u64,
            "passed": self.passed(),
        });
        if let Err(failure) = &self.outcome {
            report["failed_step"] = serde_json::json!(failure.step);
            report["error_kind"] = serde_json::json!(failure.error.kind());
            report["error"] = serde_json::json!(failure.error.to_string());
            if let Some(mismatch) = failure.error.mismatch() {
                report["differences"] = serde_json::json!(mismatch.differences);
            }
        }
        report
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(()) => write!(
                f,
                "PASS {} ({}, {} ms)",
                self.scenario,
                self.index,
                self.elapsed.as_millis()
            ),
            Err(failure) => write!(
                f,
                "FAIL {} ({}): {}",
                self.scenario, self.index, failure
            ),
        }
    }
}
