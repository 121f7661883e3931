//! Session manager: owns the opaque session token and the login, verify,
//! and refresh flows against the eero cloud.
//!
//! Login is two-step: submitting an email address or phone number returns a
//! short-lived `user_token`, and submitting the verification code sent to
//! that identifier promotes it into the durable session token.

use crate::api::{ApiClient, Transport};
use crate::error::ApiError;
use crate::session::store::SessionStorage;
use serde_json::Value;

pub struct SessionManager<S: SessionStorage, T: Transport = ApiClient> {
    store: S,
    transport: T,
    cookie: Option<String>,
}

impl<S: SessionStorage> SessionManager<S, ApiClient> {
    pub fn new(store: S, client: ApiClient) -> Self {
        Self::with_transport(store, client)
    }
}

impl<S: SessionStorage, T: Transport> SessionManager<S, T> {
    /// Build a manager over any transport, reading the persisted token.
    ///
    /// A missing token means unauthenticated; an unreadable store is logged
    /// and treated the same way so the host keeps running.
    pub fn with_transport(store: S, transport: T) -> Self {
        let cookie = match store.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::error!("Could not read session token: {}", e);
                None
            }
        };
        if cookie.is_none() {
            tracing::debug!("No session token found; polling will return empty results");
        }
        Self {
            store,
            transport,
            cookie,
        }
    }

    /// The persisted session token, if any.
    pub fn current_token(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// Submit a login identifier (email address or phone number).
    ///
    /// Returns the short-lived `user_token` that must be paired with the
    /// verification code sent to the identifier. Nothing is persisted yet.
    pub fn login(&self, identifier: &str) -> Result<String, ApiError> {
        let body = serde_json::json!({ "login": identifier });
        let data = self.transport.post("login", None, Some(&body))?;
        data.get("user_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .ok_or(ApiError::MissingToken)
    }

    /// Submit the verification code for a pending `user_token`.
    ///
    /// On success the pending token becomes the durable session token and is
    /// persisted.
    pub fn verify(&mut self, user_token: &str, code: &str) -> Result<(), ApiError> {
        let body = serde_json::json!({ "code": code });
        self.transport
            .post("login/verify", Some(user_token), Some(&body))?;
        self.adopt_token(user_token.to_string());
        tracing::info!("Login verified; session token persisted");
        Ok(())
    }

    /// Exchange the current session token for a new one.
    ///
    /// If the server does not return a new token the current one is left
    /// untouched, in memory and on disk, so the caller can retry later.
    pub fn refresh(&mut self) -> Result<(), ApiError> {
        let cookie = self.cookie.clone().ok_or(ApiError::NotAuthenticated)?;
        let data = self.transport.post("login/refresh", Some(&cookie), None)?;
        match data.get("user_token").and_then(Value::as_str) {
            Some(token) if !token.is_empty() => {
                tracing::debug!("Session refreshed; adopting new token");
                self.adopt_token(token.to_string());
                Ok(())
            }
            _ => {
                tracing::error!("Session refresh response did not include a new token");
                Err(ApiError::RefreshFailed)
            }
        }
    }

    /// Run a request with the current session cookie.
    ///
    /// If it fails because the session expired, refresh and retry exactly
    /// once; every other error (including a failure of the retried request)
    /// propagates unmodified. This is the sole retry policy in the tracker.
    pub fn with_session<R>(
        &mut self,
        request: impl Fn(&T, &str) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let cookie = self.cookie.clone().ok_or(ApiError::NotAuthenticated)?;
        match request(&self.transport, &cookie) {
            Err(ApiError::SessionExpired { code, message }) => {
                tracing::debug!(
                    "Session expired ({}: {}); refreshing and retrying once",
                    code,
                    message
                );
                self.refresh()?;
                let cookie = self.cookie.clone().ok_or(ApiError::NotAuthenticated)?;
                request(&self.transport, &cookie)
            }
            other => other,
        }
    }

    /// Adopt a token: in-memory first, then best-effort persistence. A
    /// failed disk write is logged but must not take down a working session.
    fn adopt_token(&mut self, token: String) {
        self.cookie = Some(token);
        if let Some(token) = &self.cookie {
            if let Err(e) = self.store.save(token) {
                tracing::error!("Failed to persist session token: {}", e);
            }
        }
    }
}
