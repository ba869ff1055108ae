use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub timestamp: String,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match sqlx::query("SELECT 1").execute(state.db_pool()).await {
        Ok(_) => "ok",
        Err(error) => {
            tracing::warn!(?error, "database health probe failed");
            "unavailable"
        }
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        database: database.to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
