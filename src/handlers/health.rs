// src/handlers/health.rs

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::{common::error::AppError, config::AppState};

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "API e banco de dados respondendo"),
        (status = 500, description = "Banco de dados indisponível")
    )
)]
pub async fn health(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    sqlx::query("SELECT 1").execute(&app_state.db_pool).await?;
    Ok(Json(json!({ "status": "ok" })))
}
