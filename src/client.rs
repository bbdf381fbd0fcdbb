//! Outbound calls to the public demo API.

use std::time::Duration;

use reqwest::header::{HeaderMap as ReqwestHeaders, HeaderName, HeaderValue};
use serde_json::Value;

use reqtrail::headers::{self, HeaderMap};

/// Default upstream for `/todos`.
pub const TODO_URL: &str = "https://jsonplaceholder.typicode.com/todos/1";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid outbound header `{0}`")]
    Header(String),

    #[error("request failed: {0}")]
    Send(#[source] reqwest::Error),

    #[error("upstream answered {0}")]
    Status(reqwest::StatusCode),

    #[error("invalid JSON from upstream: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ClientError {
    /// Message returned to the caller of the endpoint that made the call.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Header(_) => "Failed to create request",
            Self::Send(_) | Self::Status(_) => "Failed to call external API",
            Self::Decode(_) => "Failed to parse external API response",
        }
    }
}

/// A JSON-over-HTTP upstream.
pub struct ExternalApi {
    http: reqwest::Client,
    url: String,
}

impl ExternalApi {
    pub fn new(url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(ClientError::Send)?;
        Ok(Self { http, url: url.into() })
    }

    /// GETs the upstream with `extra` headers and decodes its JSON body.
    pub async fn get_json(&self, extra: &[(&str, &str)]) -> Result<Value, ClientError> {
        let mut sent = ReqwestHeaders::new();
        for (name, value) in extra {
            let name = HeaderName::try_from(*name).map_err(|_| ClientError::Header((*name).to_owned()))?;
            let value = HeaderValue::try_from(*value).map_err(|_| ClientError::Header(name.to_string()))?;
            sent.append(name, value);
        }

        let res = self.http.get(&self.url).headers(sent).send().await.map_err(ClientError::Send)?;
        if !res.status().is_success() {
            return Err(ClientError::Status(res.status()));
        }
        res.json().await.map_err(ClientError::Decode)
    }
}

/// The headers an outbound call carries, keyed the way request headers are
/// logged.
pub fn outbound_header_map(extra: &[(&str, &str)]) -> HeaderMap {
    headers::collect(extra.iter().copied())
}
