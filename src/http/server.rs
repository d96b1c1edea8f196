//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the figure and health handlers
//! - Wire up middleware (request ID, tracing)
//! - Build the upstream client from configuration
//! - Serve until the shutdown signal fires, then drain

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::figure::{figure_handler, FigureState, UpstreamClient, ROUTE_PREFIX};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::response::health;

/// HTTP server for the figure proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails only if the upstream HTTP client cannot be built.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let upstream = UpstreamClient::new(&config.upstream, &config.timeouts)?;

        tracing::info!(
            upstream = %upstream.base_url(),
            connect_timeout_secs = config.timeouts.connect_secs,
            request_timeout_secs = config.timeouts.request_secs,
            "Upstream client ready"
        );

        let state = FigureState {
            upstream: Arc::new(upstream),
        };

        Ok(Self {
            router: Self::build_router(state),
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: FigureState) -> Router {
        let figures = Router::new()
            .route(ROUTE_PREFIX, get(figure_handler))
            .route(&format!("{ROUTE_PREFIX}/"), get(figure_handler))
            .route(&format!("{ROUTE_PREFIX}/{{*params}}"), get(figure_handler))
            .with_state(state);

        Router::new()
            .route("/health", get(health))
            .merge(figures)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(propagate_request_id_layer()),
            )
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires (or its sender is dropped).
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
