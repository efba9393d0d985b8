use crate::decode::DecodeError;
use crate::diff::Difference;
use blackcheck_http::TransportError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Differences reported when a normalized response does not match its fixture.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub subject: String,
    pub differences: Vec<Difference>,
}

/// How many differences are spelled out in `Display`.
const SHOWN_DIFFERENCES: usize = 20;

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} differs in {} place(s)",
            self.subject,
            self.differences.len()
        )?;
        for difference in self.differences.iter().take(SHOWN_DIFFERENCES) {
            write!(f, "\n  {}", difference)?;
        }
        if self.differences.len() > SHOWN_DIFFERENCES {
            write!(
                f,
                "\n  ... and {} more",
                self.differences.len() - SHOWN_DIFFERENCES
            )?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Transport failure: {0}")]
    TransportFailure(#[from] TransportError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Assertion mismatch: {0}")]
    AssertionMismatch(Mismatch),

    #[error("Fixture {path}: {source}")]
    Fixture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    /// The scenario's task panicked or was cancelled before reporting.
    #[error("Scenario aborted: {0}")]
    Aborted(String),
}

impl HarnessError {
    /// Short label for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            HarnessError::TransportFailure(_) => "transport_failure",
            HarnessError::Decode(_) => "decode_error",
            HarnessError::AssertionMismatch(_) => "assertion_mismatch",
            HarnessError::Fixture { .. } => "fixture_error",
            HarnessError::Config(_) => "config_error",
            HarnessError::Aborted(_) => "aborted",
        }
    }

    pub fn mismatch(&self) -> Option<&Mismatch> {
        match self {
            HarnessError::AssertionMismatch(m) => Some(m),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
