//! Token types: what an authorization flow hands back to the reporter.

use chrono::{DateTime, Utc};
use std::fmt;

/// Outcome of one interactive authorization.
///
/// `Failed` is a provider-side rejection that the flow reported as data
/// rather than as an error (invalid client, consent denied, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenResult {
    Succeeded(TokenGrant),
    Failed(ProviderError),
}

/// Tokens from a single token-endpoint response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expiry: Expiry,
}

/// Expiry as the provider reports it. Not normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expiry {
    /// Absolute expiry time (Gmail).
    At(DateTime<Utc>),
    /// Seconds until expiry, as returned by the token endpoint (Outlook).
    In(u64),
    Unknown,
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expiry::At(at) => write!(f, "{}", at.format("%Y-%m-%d %H:%M:%S")),
            Expiry::In(secs) => write!(f, "{} seconds", secs),
            Expiry::Unknown => write!(f, "None"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub error: String,
    pub error_description: Option<String>,
}

impl ProviderError {
    pub fn new(error: impl Into<String>, error_description: Option<String>) -> Self {
        Self {
            error: error.into(),
            error_description,
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_expiry_display_absolute() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 5).unwrap();
        assert_eq!(Expiry::At(at).to_string(), "2025-03-01 12:30:05");
    }

    #[test]
    fn test_expiry_display_relative() {
        assert_eq!(Expiry::In(3599).to_string(), "3599 seconds");
    }

    #[test]
    fn test_expiry_display_unknown() {
        assert_eq!(Expiry::Unknown.to_string(), "None");
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::new("invalid_client", Some("bad id".to_string()));
        assert_eq!(err.to_string(), "invalid_client: bad id");
        assert_eq!(ProviderError::new("access_denied", None).to_string(), "access_denied");
    }
}
