//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router (`/api` status endpoints + proxy fallback)
//! - Wire up middleware (request ID, tracing, timeout)
//! - Classify each path and dispatch to the generic or Git forwarder
//! - Swap in reloaded configuration without dropping in-flight requests
//! - Record per-request metrics

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::api;
use crate::config::ProxyConfig;
use crate::http::request::RequestMeta;
use crate::observability::metrics;
use crate::pages::ErrorPages;
use crate::proxy::error::report;
use crate::proxy::{forward, git, ForwardContext, ForwardError};
use crate::routing::{classify, Forwarding};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Current configuration; replaced wholesale on reload.
    pub config: Arc<ArcSwap<ProxyConfig>>,
    pub client: reqwest::Client,
    pub pages: Arc<ErrorPages>,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Self {
        let pages = ErrorPages::new(config.pages.custom_404.as_deref().map(Path::new));
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            client: reqwest::Client::new(),
            pages: Arc::new(pages),
        }
    }
}

/// HTTP server for the reverse proxy.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        let timeout = Duration::from_secs(config.server.request_timeout_secs);
        let state = AppState::new(config);
        let router = Self::build_router(timeout, state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(timeout: Duration, state: AppState) -> Router {
        Router::new()
            .nest("/api", api::setup_api_router())
            .fallback(proxy_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Configurations received on `config_updates` replace the current
    /// snapshot for subsequent requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let shared = self.state.config.clone();
        let reloader = tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                let current = shared.load();
                if new_config.server.bind_address != current.server.bind_address {
                    tracing::warn!(
                        bind_address = %new_config.server.bind_address,
                        "Bind address changes take effect after restart"
                    );
                }
                if new_config.pages.custom_404 != current.pages.custom_404 {
                    tracing::warn!("Custom 404 page changes take effect after restart");
                }
                shared.store(Arc::new(new_config));
                tracing::info!("Configuration snapshot updated");
            }
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Classifies the path and forwards to the matching upstream.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let meta = RequestMeta::from_request(&request);
    let config = state.config.load_full();

    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let route = match classify(&path_and_query) {
        Ok(route) => route,
        Err(e) => {
            tracing::debug!(path = %meta.path, error = %e, "Path does not map to an upstream");
            let err = ForwardError::InvalidRoute {
                path: meta.path.clone(),
            };
            let response = report(&state.pages, &meta, err).await;
            metrics::record_request("invalid", response.status().as_u16(), start);
            return response;
        }
    };

    tracing::debug!(
        client_ip = %meta.client_ip,
        method = %meta.method,
        route = route.kind.as_str(),
        target = %route.target,
        "Proxying request"
    );

    let ctx = ForwardContext {
        client: &state.client,
        config: &config,
        pages: &state.pages,
        meta: &meta,
    };
    let response = match route.forwarding() {
        Forwarding::Generic => forward::forward(&ctx, request, &route).await,
        Forwarding::Git => git::forward(&ctx, request, &route).await,
    };

    metrics::record_request(route.kind.as_str(), response.status().as_u16(), start);
    response
}
