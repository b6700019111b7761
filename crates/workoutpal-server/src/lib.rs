//! HTTP surface of the WorkoutPal API
//!
//! Hosts the health route, the request-body extractors and the responder
//! that writes error envelopes.

mod cors;
mod extract;
mod health;
pub mod respond;

use std::net::SocketAddr;

use axum::Router;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use workoutpal_config::Config;

pub use extract::{JsonBody, ValidJson};
pub use health::HealthState;
pub use respond::{ErrorResponse, respond, respond_with_status};

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// The database pool connects lazily, so an unreachable database does
    /// not prevent startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the database URL cannot be parsed
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let listen_address = config.server.listen_address_or_default();

        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(config.database.acquire_timeout_duration())
            .connect_lazy(config.database.url.expose_secret())
            .map_err(|e| anyhow::anyhow!("failed to configure database pool: {e}"))?;

        let mut app = Router::new();

        // Health check
        if config.server.health.enabled {
            app = app.route(
                &config.server.health.path,
                axum::routing::get(health::health_handler).with_state(HealthState::new(pool)),
            );
        }

        // Apply middleware layers (innermost first)

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        // CORS
        if let Some(ref cors_config) = config.server.cors {
            app = app.layer(cors::cors_layer(cors_config));
        }

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener, or for
    /// merging in application routes
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address)
            .await
            .map_err(|e| anyhow::anyhow!("failed to bind {}: {e}", self.listen_address))?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
