use crate::client::error_classification::{error_class_for_status, is_transient_error_class};
use std::fmt;

/// What went wrong while fetching a narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Connection, DNS or TLS failure.
    Transport,
    Timeout,
    /// The backend answered with a non-success HTTP status.
    Status,
    /// The body could not be decoded as a narrative.
    Decode,
    /// The attempt task panicked or was cancelled by runtime shutdown.
    Aborted,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchErrorKind::Transport => "transport",
            FetchErrorKind::Timeout => "timeout",
            FetchErrorKind::Status => "status",
            FetchErrorKind::Decode => "decode",
            FetchErrorKind::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// A failed narrative fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} failure{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
    pub status: Option<u16>,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Status,
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Transport, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Decode, message)
    }

    pub fn aborted(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Aborted, message)
    }

    /// Stable error class for logs and UI copy.
    pub fn class(&self) -> &'static str {
        match (self.kind, self.status) {
            (FetchErrorKind::Status, Some(s)) => error_class_for_status(s),
            (FetchErrorKind::Timeout, _) => "timeout",
            (FetchErrorKind::Transport, _) => "transport",
            (FetchErrorKind::Decode, _) => "invalid_response",
            _ => "unknown",
        }
    }

    /// Whether the same request may succeed if issued again later.
    pub fn is_transient(&self) -> bool {
        is_transient_error_class(self.class())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::new(FetchErrorKind::Timeout, e.to_string())
        } else if e.is_decode() {
            FetchError::decode(e.to_string())
        } else {
            FetchError::transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_status_when_present() {
        assert_eq!(
            FetchError::status(500, "Internal Server Error").to_string(),
            "status failure (HTTP 500): Internal Server Error"
        );
        assert_eq!(
            FetchError::transport("connection refused").to_string(),
            "transport failure: connection refused"
        );
    }

    #[test]
    fn class_maps_status_codes() {
        assert_eq!(FetchError::status(429, "").class(), "rate_limited");
        assert_eq!(FetchError::status(503, "").class(), "overloaded");
        assert_eq!(FetchError::decode("bad json").class(), "invalid_response");
        assert!(FetchError::status(502, "").is_transient());
        assert!(!FetchError::status(400, "").is_transient());
    }
}
