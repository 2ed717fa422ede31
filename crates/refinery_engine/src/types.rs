use std::fmt;

use refinery_core::{ExtractionResult, SubmissionSeq};

/// Message shown for failures whose details only matter to the logs.
pub const GENERIC_FAILURE: &str = "Operation failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A submission finished. Superseded submissions never produce one.
    Completed {
        seq: SubmissionSeq,
        result: Result<ExtractionResult, TransportError>,
    },
}

/// Body returned by the batch endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchArchive {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// A classified failure. `message` is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The configured API URL does not form a valid endpoint.
    InvalidEndpoint,
    /// The service could not be reached or dropped the connection.
    Network,
    Timeout,
    /// Non-success status with a `detail` message from the service.
    Service { status: u16 },
    /// Non-success status without a usable `detail`.
    HttpStatus(u16),
    /// Success status but the body did not match the expected shape.
    Decode,
    TooLarge { max_bytes: u64, actual: Option<u64> },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidEndpoint => write!(f, "invalid endpoint"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Service { status } => write!(f, "service error (status {status})"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Decode => write!(f, "undecodable response"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
        }
    }
}
