//! Error types for Courtpost

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::accounts::Account;

pub type Result<T> = std::result::Result<T, CourtpostError>;

#[derive(Error, Debug)]
pub enum CourtpostError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown account '{0}' (expected one of: {expected})", expected = Account::alias_list())]
    UnknownAccount(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

impl CourtpostError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CourtpostError::Config(_) => FailureKind::Configuration,
            CourtpostError::UnknownAccount(_) => FailureKind::UnknownAccount,
            CourtpostError::MissingCredential(_) => FailureKind::MissingCredential,
            CourtpostError::InvalidInput(_) => FailureKind::InvalidInput,
            CourtpostError::Submission(SubmissionError::Authentication(_)) => {
                FailureKind::Authentication
            }
            CourtpostError::Submission(SubmissionError::Rejected(_)) => FailureKind::Rejected,
            CourtpostError::Submission(SubmissionError::Transport(_)) => FailureKind::Transport,
            CourtpostError::Submission(SubmissionError::Response(_)) => FailureKind::Response,
        }
    }

    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }
}

/// Flat classification of a failed invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Configuration,
    UnknownAccount,
    MissingCredential,
    InvalidInput,
    Authentication,
    Rejected,
    Transport,
    Response,
}

impl FailureKind {
    pub fn exit_code(&self) -> i32 {
        match self {
            FailureKind::InvalidInput | FailureKind::UnknownAccount => 3,
            FailureKind::MissingCredential | FailureKind::Authentication => 2,
            FailureKind::Configuration
            | FailureKind::Rejected
            | FailureKind::Transport
            | FailureKind::Response => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // The offending line is not echoed: it may hold a secret.
    #[error("Malformed line {line} in {}: expected KEY=VALUE", .path.display())]
    MalformedLine { path: PathBuf, line: usize },

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Could not determine the configuration directory for this platform")]
    NoConfigDir,

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Failure reported by, or while talking to, the remote service.
///
/// Every variant displays its message verbatim so operators see exactly what
/// the service or transport said.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// The service refused the credentials (HTTP 401)
    #[error("{0}")]
    Authentication(String),

    /// The service rejected the request (any other non-success status)
    #[error("{0}")]
    Rejected(String),

    /// The request never produced a response (connect, timeout, I/O)
    #[error("{0}")]
    Transport(String),

    /// The service answered with success but the body was unusable
    #[error("{0}")]
    Response(String),
}

impl SubmissionError {
    /// Short lowercase label used in logs and JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            SubmissionError::Authentication(_) => "authentication",
            SubmissionError::Rejected(_) => "rejected",
            SubmissionError::Transport(_) => "transport",
            SubmissionError::Response(_) => "response",
        }
    }
}
