//! Response dispatch: translate or pass through.
//!
//! # Responsibilities
//! - Decide per upstream response whether translation applies
//! - Turn the decision into the response sent to the legacy client
//!
//! # Design Decisions
//! - Translation applies only when `content-type` contains `application/json`
//! - Fail open: any translation error returns the upstream response unchanged
//! - The decision is a value (`Dispatch`) so the fallback is an explicit branch

use axum::body::Body;
use axum::http::header::{HeaderValue, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::translate::{translate_bytes, TranslateError, V2Envelope};
use crate::upstream::headers::passthrough_response_headers;
use crate::upstream::UpstreamResponse;

/// Media type that marks a response as eligible for translation.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// A successful v3 → v2 translation.
#[derive(Debug)]
pub struct Translation {
    /// Parsed upstream body.
    pub upstream: Value,
    pub envelope: V2Envelope,
    /// Serialized `envelope`.
    pub body: Vec<u8>,
}

/// Why the upstream response is returned unchanged.
#[derive(Debug)]
pub enum PassthroughReason {
    NotJson,
    Failed(TranslateError),
}

/// Per-response decision.
#[derive(Debug)]
pub enum Dispatch {
    Translated(Translation),
    Passthrough(PassthroughReason),
}

impl Dispatch {
    /// Label used in logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Dispatch::Translated(_) => "translated",
            Dispatch::Passthrough(PassthroughReason::NotJson) => "not_json",
            Dispatch::Passthrough(PassthroughReason::Failed(e)) => e.kind(),
        }
    }

    /// Build the client response from the decision.
    pub fn into_response(self, upstream: UpstreamResponse) -> Response {
        match self {
            Dispatch::Translated(translation) => {
                translated_response(upstream.status, translation.body)
            }
            Dispatch::Passthrough(_) => passthrough_response(upstream),
        }
    }
}

pub fn is_json(content_type: &str) -> bool {
    content_type.contains(JSON_MEDIA_TYPE)
}

/// Decide what to return for an upstream response.
///
/// `service` is the request's `service` query parameter.
pub fn dispatch(upstream: &UpstreamResponse, service: Option<&str>) -> Dispatch {
    if !is_json(upstream.content_type()) {
        return Dispatch::Passthrough(PassthroughReason::NotJson);
    }

    let translated = translate_bytes(&upstream.body, service).and_then(|(value, envelope)| {
        let body = envelope.to_vec().map_err(TranslateError::Encode)?;
        Ok(Translation {
            upstream: value,
            envelope,
            body,
        })
    });

    match translated {
        Ok(translation) => Dispatch::Translated(translation),
        Err(e) => Dispatch::Passthrough(PassthroughReason::Failed(e)),
    }
}

/// Upstream status, a single `Content-Type: application/json`, the v2 body.
pub fn translated_response(status: StatusCode, body: Vec<u8>) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
    response
}

/// The upstream response as received, minus hop-by-hop headers.
pub fn passthrough_response(upstream: UpstreamResponse) -> Response {
    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;
    *response.headers_mut() = passthrough_response_headers(&upstream.headers);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Bytes};
    use axum::http::HeaderMap;
    use crate::translate::SchemaMismatch;

    const V3_BODY: &str = r#"{"r1":{"publication":[{"name":"A","description":"B","startDate":"2026-02-05T05:00:03","endDate":"2026-02-05T05:50:00"}]}}"#;
    const V2_BODY: &str = r#"{"list":{"r1":[{"start_time":"2026-02-05T05:00:03","end_time":"2026-02-05T05:50:00","title":"A","content":"B"}]}}"#;

    fn upstream(status: StatusCode, content_type: Option<&'static str>, body: &str) -> UpstreamResponse {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        headers.insert("x-upstream", HeaderValue::from_static("v3"));
        UpstreamResponse {
            status,
            headers,
            body: Bytes::copy_from_slice(body.as_bytes()),
        }
    }

    async fn body_of(response: Response) -> Bytes {
        to_bytes(response.into_body(), usize::MAX).await.unwrap()
    }

    #[test]
    fn test_is_json() {
        assert!(is_json("application/json"));
        assert!(is_json("application/json; charset=utf-8"));
        assert!(!is_json("text/html"));
        assert!(!is_json(""));
        assert!(!is_json("Application/JSON"));
    }

    #[tokio::test]
    async fn test_json_response_translated() {
        let up = upstream(StatusCode::OK, Some("application/json; charset=utf-8"), V3_BODY);
        let decision = dispatch(&up, Some("r1"));
        assert_eq!(decision.outcome(), "translated");

        let response = decision.into_response(up);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().len(), 1);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body_of(response).await, V2_BODY.as_bytes());
    }

    #[tokio::test]
    async fn test_upstream_status_copied_on_translation() {
        let up = upstream(StatusCode::CREATED, Some("application/json"), V3_BODY);
        let response = dispatch(&up, Some("r1")).into_response(up);
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_non_json_passes_through_unchanged() {
        let up = upstream(StatusCode::NOT_FOUND, Some("text/html"), "<h1>nope</h1>");
        let decision = dispatch(&up, Some("r1"));
        assert!(matches!(decision, Dispatch::Passthrough(PassthroughReason::NotJson)));

        let response = decision.into_response(up);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html");
        assert_eq!(response.headers()["x-upstream"], "v3");
        assert_eq!(body_of(response).await, "<h1>nope</h1>".as_bytes());
    }

    #[test]
    fn test_missing_content_type_is_not_json() {
        let up = upstream(StatusCode::OK, None, V3_BODY);
        assert_eq!(dispatch(&up, Some("r1")).outcome(), "not_json");
    }

    #[tokio::test]
    async fn test_service_mismatch_falls_back() {
        let up = upstream(StatusCode::OK, Some("application/json"), V3_BODY);
        let decision = dispatch(&up, Some("r2"));
        assert!(matches!(
            decision,
            Dispatch::Passthrough(PassthroughReason::Failed(TranslateError::SchemaMismatch(
                SchemaMismatch::KeyMismatch { .. }
            )))
        ));

        let response = decision.into_response(up);
        assert_eq!(response.headers()["x-upstream"], "v3");
        assert_eq!(body_of(response).await, V3_BODY.as_bytes());
    }

    #[tokio::test]
    async fn test_invalid_json_falls_back() {
        let up = upstream(StatusCode::BAD_GATEWAY, Some("application/json"), "{oops");
        let decision = dispatch(&up, Some("r1"));
        assert_eq!(decision.outcome(), "parse_error");

        let response = decision.into_response(up);
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_of(response).await, "{oops".as_bytes());
    }

    #[test]
    fn test_field_missing_falls_back() {
        let body = r#"{"r1":{"publication":[{"name":"A","startDate":"s","endDate":"e"}]}}"#;
        let up = upstream(StatusCode::OK, Some("application/json"), body);
        assert_eq!(dispatch(&up, Some("r1")).outcome(), "field_missing");
    }

    #[test]
    fn test_absent_service_falls_back() {
        let up = upstream(StatusCode::OK, Some("application/json"), V3_BODY);
        assert_eq!(dispatch(&up, None).outcome(), "schema_mismatch");
    }
}
