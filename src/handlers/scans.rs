// src/handlers/scans.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, config::AppState, models::scans::ScanTransaction};

// O upload e o envio para processamento acontecem antes; aqui só registramos o GUID devolvido.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackScanPayload {
    pub user_id: i32,
    pub transaction_guid: Uuid,
    #[validate(url(message = "A URL do arquivo é inválida."))]
    pub s3_url: String,
}

#[utoipa::path(
    post,
    path = "/api/scans",
    tag = "Scans",
    request_body = TrackScanPayload,
    responses(
        (status = 201, description = "Scan em acompanhamento", body = ScanTransaction),
        (status = 404, description = "Usuário não encontrado")
    )
)]
pub async fn track_scan(
    State(app_state): State<AppState>,
    Json(payload): Json<TrackScanPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let scan = app_state
        .scan_service
        .track(payload.user_id, payload.transaction_guid, payload.s3_url)
        .await?;
    Ok((StatusCode::CREATED, Json(scan)))
}

#[utoipa::path(
    get,
    path = "/api/scans/{transaction_guid}",
    tag = "Scans",
    params(("transaction_guid" = Uuid, Path, description = "GUID da tarefa")),
    responses(
        (status = 200, description = "Situação do scan", body = ScanTransaction),
        (status = 404, description = "Scan não encontrado")
    )
)]
pub async fn get_scan(
    State(app_state): State<AppState>,
    Path(transaction_guid): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scan = app_state.scan_service.get_scan(transaction_guid).await?;
    Ok(Json(scan))
}
