//! HttpSink - form-encoded POST to a fixed downstream endpoint
//!
//! Every send goes to the same URL with the same header set. The response
//! body is ignored; only the status is kept for the outcome.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::domain::{DeliveryOutcome, FailureReason, FormPayload};
use crate::error::DeferralError;
use crate::ports::Sink;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Downstream target and the fixed headers sent with every request.
///
/// Defaults point at the interest-list form this service was built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSinkConfig {
    pub endpoint: String,
    pub referer: String,
    pub origin: String,
    pub accept: String,
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout_ms: u64,
}

impl Default for HttpSinkConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://magisrent.nl/interestlist".to_string(),
            referer: "https://magisrent.nl/interestlist?building=MRX".to_string(),
            origin: "https://magisrent.nl".to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 \
                         (KHTML, like Gecko) Version/16.3 Safari/605.1.15"
                .to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl HttpSinkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn headers(&self) -> Result<HeaderMap, DeferralError> {
        let value = |name: &str, raw: &str| {
            HeaderValue::from_str(raw)
                .map_err(|e| DeferralError::Sink(format!("invalid {name} header {raw:?}: {e}")))
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        headers.insert(REFERER, value("referer", &self.referer)?);
        headers.insert(ORIGIN, value("origin", &self.origin)?);
        headers.insert(ACCEPT, value("accept", &self.accept)?);
        headers.insert(USER_AGENT, value("user-agent", &self.user_agent)?);
        Ok(headers)
    }
}

pub struct HttpSink {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    headers: HeaderMap,
}

impl HttpSink {
    /// Validates the endpoint and header values up front so a bad
    /// configuration fails at startup instead of on every send.
    pub fn new(config: HttpSinkConfig) -> Result<Self, DeferralError> {
        let endpoint = reqwest::Url::parse(&config.endpoint)
            .map_err(|e| DeferralError::Sink(format!("invalid endpoint {:?}: {e}", config.endpoint)))?;
        let headers = config.headers()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| DeferralError::Sink(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            headers,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

#[async_trait]
impl Sink for HttpSink {
    async fn send(&self, payload: &FormPayload) -> DeliveryOutcome {
        let body = match payload.encode() {
            Ok(body) => body,
            Err(err) => return DeliveryOutcome::Failed(FailureReason::Request(err.to_string())),
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .body(body)
            .send()
            .await;

        match response {
            Ok(resp) => {
                let status = resp.status().as_u16();
                if resp.status().is_success() {
                    DeliveryOutcome::Delivered { status }
                } else {
                    DeliveryOutcome::Rejected { status }
                }
            }
            Err(err) if err.is_timeout() => DeliveryOutcome::Failed(FailureReason::Timeout),
            Err(err) if err.is_builder() => {
                DeliveryOutcome::Failed(FailureReason::Request(err.to_string()))
            }
            Err(err) => DeliveryOutcome::Failed(FailureReason::Network(err.to_string())),
        }
    }
}
