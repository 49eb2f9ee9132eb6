// Moderation domain models - data structures for the content filter.
//
// These are pure domain types with no HTTP or storage dependencies.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Outcome of running text through the filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOutcome {
    /// Whether disallowed content was found
    pub flagged: bool,
    /// Display-safe version of the input
    pub rewritten: String,
}

impl FilterOutcome {
    /// A clean result that passes the text through untouched.
    pub fn clean(text: &str) -> Self {
        Self {
            flagged: false,
            rewritten: text.to_string(),
        }
    }
}

/// Coarse verdict returned by an external classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierVerdict {
    Safe,
    Unsafe,
}

/// What an external classifier said about a piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClassifierResponse {
    pub verdict: ClassifierVerdict,
    /// Optional rewrite when the verdict is unsafe. Either a fully opaque
    /// placeholder or a best-effort token-level redaction.
    #[serde(default)]
    pub rewritten: Option<String>,
}

impl ClassifierResponse {
    pub fn safe() -> Self {
        Self {
            verdict: ClassifierVerdict::Safe,
            rewritten: None,
        }
    }

    pub fn is_unsafe(&self) -> bool {
        self.verdict == ClassifierVerdict::Unsafe
    }
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("Classifier timed out after {0:?}")]
    Timeout(Duration),

    #[error("Classifier returned an invalid response: {0}")]
    InvalidResponse(String),
}
