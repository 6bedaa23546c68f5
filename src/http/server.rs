//! HTTP server setup and the proxy handler.
//!
//! # Responsibilities
//! - Create the Axum Router with a wildcard route for GET/POST/PUT/DELETE
//! - Wire up middleware (request ID, tracing, body limit)
//! - Drive each request through `Received → Normalized → Forwarded → {Translated | Passthrough} → Sent`
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Method, Request, Uri},
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::dump::{DumpTarget, DumpWriter};
use crate::http::error::ProxyError;
use crate::http::request::{request_id, ProxyRequest, UuidRequestId};
use crate::http::response::{dispatch, Dispatch, PassthroughReason};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::upstream::{ForwardError, UpstreamForwarder};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: UpstreamForwarder,
    /// Present only when debug dumps are enabled.
    pub dumps: Option<DumpWriter>,
}

/// HTTP server for the translating proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ForwardError> {
        let config = Arc::new(config);
        let forwarder = UpstreamForwarder::new(&config.upstream)?;
        let dumps = config
            .debug
            .enabled
            .then(|| DumpWriter::new(&config.debug.dump_dir));

        let state = AppState {
            forwarder,
            dumps,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let proxy: MethodRouter<AppState> = get(proxy_handler)
            .post(proxy_handler)
            .put(proxy_handler)
            .delete(proxy_handler);

        Router::new()
            .route("/", proxy.clone())
            .route("/{*path}", proxy)
            .layer(DefaultBodyLimit::max(config.limits.max_body_size))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            method = %req.method(),
                            uri = %req.uri(),
                            request_id = %request_id(req.headers())
                        )
                    }))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener until shutdown.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            debug = self.config.debug.enabled,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Normalizes the query, forwards upstream, and translates or passes through.
async fn proxy_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&headers).to_string();
    let mut request = ProxyRequest::new(method, &uri, headers, body);
    let method_str = request.method.to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %request.method,
        path = %request.path,
        query = %request.query.to_query_string(),
        "Proxying request"
    );

    // Dumps name files after the query as the client sent it.
    let received_query = state.dumps.as_ref().map(|_| request.query.clone());

    if let Some(date) = request.query.normalize_date() {
        tracing::debug!(request_id = %request_id, date = %date, "Date parameter normalized");
    }

    let upstream = match state
        .forwarder
        .forward(
            request.method.clone(),
            &request.path,
            &request.headers,
            &request.query,
            request.body.clone(),
        )
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                path = %request.path,
                error = %e,
                "Upstream error"
            );
            metrics::record_upstream_error(e.kind());
            let error = ProxyError::from(e);
            metrics::record_request(&method_str, error.status().as_u16(), "upstream_error", start_time);
            return error.into_response();
        }
    };

    let decision = dispatch(&upstream, request.query.service());
    let outcome = decision.outcome();
    metrics::record_translation(outcome);

    match &decision {
        Dispatch::Translated(translation) => {
            if let (Some(writer), Some(query)) = (&state.dumps, &received_query) {
                if let Some(target) = DumpTarget::from_request(&request.path, query) {
                    if let Err(e) = writer
                        .write(&target, &upstream.body, &translation.upstream, &translation.envelope)
                        .await
                    {
                        tracing::warn!(request_id = %request_id, error = %e, "Failed to write debug dump");
                    }
                }
            }
        }
        Dispatch::Passthrough(PassthroughReason::Failed(e)) => {
            tracing::warn!(
                request_id = %request_id,
                path = %request.path,
                reason = outcome,
                error = %e,
                "JSON transformation failed, passing upstream response through"
            );
        }
        Dispatch::Passthrough(PassthroughReason::NotJson) => {}
    }

    let status = upstream.status;
    let response = decision.into_response(upstream);

    tracing::info!(
        request_id = %request_id,
        method = %method_str,
        path = %request.path,
        status = status.as_u16(),
        outcome = outcome,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Request completed"
    );
    metrics::record_request(&method_str, status.as_u16(), outcome, start_time);

    response
}
