// src/handlers/payments.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::payments::Payment,
    services::payment_service::PaymentCallbackOutcome,
};

fn default_method() -> String {
    "Card".to_string()
}

fn default_status() -> String {
    "Pending".to_string()
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentionPayload {
    pub order_id: i32,
    #[validate(length(min = 1, message = "O ID da transação é obrigatório."))]
    pub transaction_id: String,
    /// Valor em centavos, como o provedor envia.
    #[validate(range(min = 1, message = "O valor deve ser maior que zero."))]
    #[schema(example = 105000)]
    pub amount_cents: i64,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_status")]
    pub status: String,
}

#[utoipa::path(
    post,
    path = "/api/payments/intentions",
    tag = "Payments",
    request_body = PaymentIntentionPayload,
    responses(
        (status = 201, description = "Pagamento registrado", body = Payment),
        (status = 404, description = "Pedido não encontrado")
    )
)]
pub async fn record_intention(
    State(app_state): State<AppState>,
    Json(payload): Json<PaymentIntentionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let payment = app_state
        .payment_service
        .record_intention(
            payload.order_id,
            payload.transaction_id,
            payload.amount_cents,
            payload.method,
            payload.status,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(payment)))
}

#[utoipa::path(
    post,
    path = "/api/payments/{transaction_id}/status/{status}",
    tag = "Payments",
    params(
        ("transaction_id" = String, Path, description = "ID da transação no provedor"),
        ("status" = String, Path, description = "Status recebido (success, failed, declined...)")
    ),
    responses(
        (status = 200, description = "Callback processado", body = PaymentCallbackOutcome),
        (status = 404, description = "Pagamento não encontrado")
    )
)]
pub async fn payment_callback(
    State(app_state): State<AppState>,
    Path((transaction_id, status)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state
        .payment_service
        .handle_callback(&transaction_id, &status)
        .await?;
    Ok(Json(outcome))
}
