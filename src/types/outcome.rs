//! Structured operation outcomes
//!
//! Every request produces an `Outcome`: a classification plus the message text
//! that goes on the wire. Callers branch on `kind`, never on message wording.

use super::error::LedgerError;
use std::fmt;

/// Classification of a request's result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Success,
    MalformedRequest,
    NotFound,
    Unauthorized,
    Rejected,
    UnknownCommand,
    Internal,
}

/// Result of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub kind: OutcomeKind,
    pub message: String,
}

impl Outcome {
    pub fn success(message: impl Into<String>) -> Self {
        Outcome {
            kind: OutcomeKind::Success,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.kind == OutcomeKind::Success
    }
}

impl From<LedgerError> for Outcome {
    fn from(error: LedgerError) -> Self {
        Outcome {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl From<Result<String, LedgerError>> for Outcome {
    fn from(result: Result<String, LedgerError>) -> Self {
        match result {
            Ok(message) => Outcome::success(message),
            Err(error) => error.into(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
