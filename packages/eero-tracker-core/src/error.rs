//! Error taxonomy for the tracker.
//!
//! API failures are tagged so callers can switch on the variant explicitly:
//! only `ApiError::SessionExpired` triggers the refresh-and-retry path in
//! `SessionManager::with_session`; everything else propagates unmodified.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the eero cloud API and its transport.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server signalled that the session token must be refreshed
    /// (envelope code 401 with error `error.session.refresh`).
    #[error("session expired (code {code}): {message}")]
    SessionExpired { code: u16, message: String },

    /// Any other 401/403 envelope: bad login, bad verification code,
    /// revoked session.
    #[error("authentication rejected (code {code}): {message}")]
    AuthRejected { code: u16, message: String },

    /// Any other non-2xx envelope code.
    #[error("api error (code {code}): {message}")]
    Api { code: u16, message: String },

    /// A request was attempted without a session token.
    #[error("no session token available; log in first")]
    NotAuthenticated,

    /// The refresh endpoint answered successfully but did not return a new
    /// token. The previously-valid token is left untouched.
    #[error("session refresh did not return a new token")]
    RefreshFailed,

    /// A login/verify response was missing the expected `user_token`.
    #[error("server response missing expected user_token")]
    MissingToken,

    /// Transport-level failure (connection, timeout, TLS).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not a valid `{meta, data}` envelope.
    #[error("malformed response envelope: {0}")]
    Envelope(#[from] serde_json::Error),
}

impl ApiError {
    /// Classify a non-success envelope `(code, error)` pair.
    pub fn from_envelope(code: u16, message: String) -> Self {
        match (code, message.as_str()) {
            (401, "error.session.refresh") => ApiError::SessionExpired { code, message },
            (401 | 403, _) => ApiError::AuthRejected { code, message },
            _ => ApiError::Api { code, message },
        }
    }
}

/// Session file could not be read or written.
#[derive(Debug, Error)]
#[error("session store '{}': {source}", path.display())]
pub struct PersistenceError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Configuration file problems. A scan interval below the minimum is not an
/// error: it is clamped with a warning at load time.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_classification() {
        let err = ApiError::from_envelope(401, "error.session.refresh".to_string());
        assert!(matches!(err, ApiError::SessionExpired { code: 401, .. }));

        let err = ApiError::from_envelope(401, "error.session.invalid".to_string());
        assert!(matches!(err, ApiError::AuthRejected { code: 401, .. }));

        let err = ApiError::from_envelope(403, "error.forbidden".to_string());
        assert!(matches!(err, ApiError::AuthRejected { code: 403, .. }));

        let err = ApiError::from_envelope(500, "error.internal".to_string());
        assert!(matches!(err, ApiError::Api { code: 500, .. }));
    }
}
