use axum::Json;
use axum::extract::State;
use serde::Serialize;
use sqlx::PgPool;

/// Shared state for the health route
#[derive(Debug, Clone)]
pub struct HealthState {
    pool: PgPool,
}

impl HealthState {
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Body of the health response
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub database: &'static str,
    pub message: &'static str,
}

impl HealthReport {
    const fn reachable() -> Self {
        Self {
            status: "ok",
            database: "postgresql",
            message: "Connected to PostgreSQL",
        }
    }

    const fn unreachable() -> Self {
        Self {
            status: "ok",
            database: "unreachable",
            message: "PostgreSQL not reachable",
        }
    }
}

/// Health check handler
///
/// Always answers 200; the database field reports whether a pooled
/// connection could be used.
pub async fn health_handler(State(state): State<HealthState>) -> Json<HealthReport> {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => Json(HealthReport::reachable()),
        Err(e) => {
            tracing::warn!(error = %e, "database health probe failed");
            Json(HealthReport::unreachable())
        }
    }
}
