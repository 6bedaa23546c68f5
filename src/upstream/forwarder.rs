//! Outbound request to the v3 service.
//!
//! # Responsibilities
//! - Build the target URL (upstream base + inbound path + normalized query)
//! - Send method, headers and body unchanged apart from the header policy
//! - Buffer the complete upstream response
//!
//! # Design Decisions
//! - One `reqwest::Client` per process; its pool is shared by all requests
//! - Single attempt: no retries, no circuit breaking
//! - The configured request timeout covers the whole exchange including the body

use std::time::Duration;

use axum::body::Bytes;
use axum::http::header::{HeaderMap, CONTENT_TYPE};
use axum::http::{Method, StatusCode};
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;
use crate::http::query::QueryParams;
use crate::upstream::headers::outbound_request_headers;

/// Errors that can occur while talking to the upstream.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Upstream base URL or inbound path did not form a valid URL.
    #[error("invalid upstream target {0}: {1}")]
    InvalidTarget(String, url::ParseError),

    /// The upstream did not answer within the configured timeout.
    #[error("upstream timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// Connection failure, protocol error or broken body.
    #[error("upstream unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ForwardError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ForwardError::Timeout(e)
        } else {
            ForwardError::Unreachable(e)
        }
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::InvalidTarget(..) => "invalid_target",
            ForwardError::Timeout(_) => "timeout",
            ForwardError::Unreachable(e) if e.is_connect() => "connect",
            ForwardError::Unreachable(_) => "other",
            ForwardError::Client(_) => "client",
        }
    }
}

/// A fully buffered upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl UpstreamResponse {
    /// Value of the `content-type` header, or `""` when absent or not UTF-8.
    pub fn content_type(&self) -> &str {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

/// Sends proxied requests to the configured upstream.
#[derive(Debug, Clone)]
pub struct UpstreamForwarder {
    client: reqwest::Client,
    base_url: String,
}

impl UpstreamForwarder {
    /// Create a forwarder with its own connection pool.
    pub fn new(config: &UpstreamConfig) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(ForwardError::Client)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Upstream base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join the upstream base, the inbound path and the query.
    pub fn target_url(&self, path: &str, query: &QueryParams) -> Result<Url, ForwardError> {
        let raw = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };
        let mut url = Url::parse(&raw).map_err(|e| ForwardError::InvalidTarget(raw.clone(), e))?;
        if query.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&query.to_query_string()));
        }
        Ok(url)
    }

    /// Issue one request upstream and buffer the answer.
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        headers: &HeaderMap,
        query: &QueryParams,
        body: Bytes,
    ) -> Result<UpstreamResponse, ForwardError> {
        let url = self.target_url(path, query)?;

        tracing::debug!(method = %method, url = %url, "Forwarding upstream");

        let response = self
            .client
            .request(method, url)
            .headers(outbound_request_headers(headers))
            .body(body)
            .send()
            .await
            .map_err(ForwardError::from_reqwest)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(ForwardError::from_reqwest)?;

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn forwarder(base: &str) -> UpstreamForwarder {
        let config = UpstreamConfig {
            base_url: base.to_string(),
            ..UpstreamConfig::default()
        };
        UpstreamForwarder::new(&config).unwrap()
    }

    #[test]
    fn test_target_url_joins_base_and_path() {
        let fwd = forwarder("https://program-api.example/v3/");
        let query = QueryParams::parse(Some("service=r1&date=2026-02-05"));

        let url = fwd.target_url("/papiPgDateRadio", &query).unwrap();
        assert_eq!(
            url.as_str(),
            "https://program-api.example/v3/papiPgDateRadio?service=r1&date=2026-02-05"
        );
    }

    #[test]
    fn test_target_url_root_without_query() {
        let fwd = forwarder("http://127.0.0.1:9000/v3");
        let url = fwd.target_url("/", &QueryParams::default()).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/v3/");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_invalid_base_is_reported() {
        let fwd = forwarder("not a url");
        let err = fwd.target_url("/x", &QueryParams::default()).unwrap_err();
        assert!(matches!(err, ForwardError::InvalidTarget(..)));
        assert_eq!(err.kind(), "invalid_target");
    }

    #[test]
    fn test_content_type_lookup() {
        let mut headers = HeaderMap::new();
        let mut response = UpstreamResponse {
            status: StatusCode::OK,
            headers: headers.clone(),
            body: Bytes::new(),
        };
        assert_eq!(response.content_type(), "");

        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        response.headers = headers;
        assert_eq!(response.content_type(), "application/json; charset=utf-8");
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fwd = forwarder(&format!("http://{addr}"));
        let err = fwd
            .forward(
                Method::GET,
                "/pg/list",
                &HeaderMap::new(),
                &QueryParams::default(),
                Bytes::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ForwardError::Unreachable(_)));
    }
}
