// src/handlers/promo_codes.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    models::promo::{NewPromoCode, PromoCode, PromoValidation, UserPromoCodeUsage},
};

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePromoCodePayload {
    #[validate(length(min = 1, max = 50, message = "O código deve ter entre 1 e 50 caracteres."))]
    #[schema(example = "TIARA10")]
    pub code: String,
    #[schema(example = "10")]
    pub discount_percent: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[validate(range(min = 1, message = "O limite de usos deve ser maior que zero."))]
    pub max_uses: Option<i32>,
    #[validate(custom(function = "validate_not_negative"))]
    pub minimum_order_amount: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidatePromoPayload {
    #[validate(length(min = 1, message = "O código é obrigatório."))]
    pub code: String,
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "1050.00")]
    pub order_amount: Decimal,
    pub user_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedeemPromoPayload {
    pub user_id: i32,
    pub promo_code_id: i32,
    pub order_id: Option<i32>,
}

#[utoipa::path(
    post,
    path = "/api/promo-codes",
    tag = "Promo Codes",
    request_body = CreatePromoCodePayload,
    responses(
        (status = 201, description = "Cupom criado", body = PromoCode),
        (status = 409, description = "Código já existe ou datas/percentual inválidos")
    )
)]
pub async fn create_promo_code(
    State(app_state): State<AppState>,
    Json(payload): Json<CreatePromoCodePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let promo = app_state
        .promo_service
        .create_promo_code(NewPromoCode {
            code: payload.code,
            discount_percent: payload.discount_percent,
            start_date: payload.start_date,
            end_date: payload.end_date,
            is_active: payload.is_active,
            max_uses: payload.max_uses,
            minimum_order_amount: payload.minimum_order_amount,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(promo)))
}

#[utoipa::path(
    get,
    path = "/api/promo-codes",
    tag = "Promo Codes",
    responses((status = 200, description = "Todos os cupons", body = [PromoCode]))
)]
pub async fn list_promo_codes(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let promos = app_state.promo_service.list_promo_codes().await?;
    Ok(Json(promos))
}

// Cupom recusado é resposta 200 com `isValid: false`; o carrinho mostra a mensagem.
#[utoipa::path(
    post,
    path = "/api/promo-codes/validate",
    tag = "Promo Codes",
    request_body = ValidatePromoPayload,
    responses((status = 200, description = "Resultado da validação", body = PromoValidation))
)]
pub async fn validate_promo_code(
    State(app_state): State<AppState>,
    Json(payload): Json<ValidatePromoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let validation = app_state
        .promo_service
        .validate(&payload.code, payload.order_amount, payload.user_id)
        .await?;
    Ok(Json(validation))
}

#[utoipa::path(
    post,
    path = "/api/promo-codes/redeem",
    tag = "Promo Codes",
    request_body = RedeemPromoPayload,
    responses(
        (status = 201, description = "Cupom resgatado", body = UserPromoCodeUsage),
        (status = 404, description = "Cupom não encontrado"),
        (status = 409, description = "Cupom já utilizado pelo usuário")
    )
)]
pub async fn redeem_promo_code(
    State(app_state): State<AppState>,
    Json(payload): Json<RedeemPromoPayload>,
) -> Result<impl IntoResponse, AppError> {
    let usage = app_state
        .promo_service
        .redeem(payload.user_id, payload.promo_code_id, payload.order_id)
        .await?;
    Ok((StatusCode::CREATED, Json(usage)))
}
