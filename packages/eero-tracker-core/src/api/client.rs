use crate::error::ApiError;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Default API origin. Overridable through configuration for testing against
/// a local stub.
pub const DEFAULT_API_URL: &str = "https://api-user.e2ro.com/2.2";

/// Per-request timeout. The poller is synchronous, so a hung call blocks the
/// whole poll; bound it.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The two verbs the tracker needs, with the session cookie threaded through.
///
/// `ApiClient` is the production implementation; tests script responses
/// through a fake.
pub trait Transport {
    fn get(&self, action: &str, cookie: Option<&str>) -> Result<Value, ApiError>;
    fn post(&self, action: &str, cookie: Option<&str>, body: Option<&Value>)
        -> Result<Value, ApiError>;
}

/// Blocking HTTP client for the eero cloud API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                reqwest::blocking::Client::new()
            });
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn execute(
        &self,
        req: reqwest::blocking::RequestBuilder,
        cookie: Option<&str>,
    ) -> Result<Value, ApiError> {
        let req = match cookie {
            Some(token) => req.header(reqwest::header::COOKIE, format!("s={}", token)),
            None => req,
        };
        let body = req.send()?.text()?;
        parse_envelope(&body)
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl Transport for ApiClient {
    fn get(&self, action: &str, cookie: Option<&str>) -> Result<Value, ApiError> {
        let url = format!("{}/{}", self.base_url, action);
        tracing::debug!("GET {}", url);
        self.execute(self.http.get(&url), cookie)
    }

    fn post(
        &self,
        action: &str,
        cookie: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}/{}", self.base_url, action);
        tracing::debug!("POST {}", url);
        let mut req = self.http.post(&url);
        if let Some(json) = body {
            req = req.json(json);
        }
        self.execute(req, cookie)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    meta: Meta,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct Meta {
    code: u16,
    #[serde(default)]
    error: Option<String>,
}

/// Unwrap the `{meta, data}` envelope: codes 200/201 yield `data`, anything
/// else maps onto the error taxonomy.
fn parse_envelope(body: &str) -> Result<Value, ApiError> {
    let envelope: Envelope = serde_json::from_str(body)?;
    match envelope.meta.code {
        200 | 201 => Ok(envelope.data),
        code => Err(ApiError::from_envelope(
            code,
            envelope.meta.error.unwrap_or_default(),
        )),
    }
}
