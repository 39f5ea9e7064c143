// src/handlers/subscriptions.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    config::AppState,
    models::subscriptions::{SubscriptionPlan, UserSubscription},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionPayload {
    pub user_id: i32,
    pub plan_id: i32,
    pub order_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivateSubscriptionPayload {
    pub user_id: i32,
    pub order_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AiStatus {
    pub ai_active: bool,
    pub subscriptions: Vec<UserSubscription>,
}

#[utoipa::path(
    get,
    path = "/api/subscriptions/plans",
    tag = "Subscriptions",
    responses((status = 200, description = "Planos ativos, do mais barato ao mais caro", body = [SubscriptionPlan]))
)]
pub async fn list_plans(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let plans = app_state.subscription_service.list_plans().await?;
    Ok(Json(plans))
}

#[utoipa::path(
    post,
    path = "/api/subscriptions/plans/seed",
    tag = "Subscriptions",
    responses((status = 200, description = "Planos padrão (criados se não havia nenhum)", body = [SubscriptionPlan]))
)]
pub async fn seed_plans(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let plans = app_state.subscription_service.seed_default_plans().await?;
    Ok(Json(plans))
}

#[utoipa::path(
    post,
    path = "/api/subscriptions",
    tag = "Subscriptions",
    request_body = CreateSubscriptionPayload,
    responses(
        (status = 201, description = "Assinatura criada, inativa até o pagamento", body = UserSubscription),
        (status = 409, description = "Usuário já possui assinatura ativa")
    )
)]
pub async fn create_subscription(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateSubscriptionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let subscription = app_state
        .subscription_service
        .create_pending(payload.user_id, payload.plan_id, payload.order_id)
        .await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

#[utoipa::path(
    post,
    path = "/api/subscriptions/activate",
    tag = "Subscriptions",
    request_body = ActivateSubscriptionPayload,
    responses(
        (status = 200, description = "Assinatura ativada; as demais foram desativadas", body = UserSubscription),
        (status = 404, description = "Assinatura do pedido não encontrada")
    )
)]
pub async fn activate_subscription(
    State(app_state): State<AppState>,
    Json(payload): Json<ActivateSubscriptionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let subscription = app_state
        .subscription_service
        .activate(payload.user_id, payload.order_id)
        .await?;
    Ok(Json(subscription))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/subscriptions",
    tag = "Subscriptions",
    params(("user_id" = i32, Path, description = "ID do Usuário")),
    responses((status = 200, description = "Assinaturas e situação do Tiara AI", body = AiStatus))
)]
pub async fn get_ai_status(
    State(app_state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let ai_active = app_state.subscription_service.is_ai_active(user_id).await?;
    let subscriptions = app_state.subscription_service.list_user_subscriptions(user_id).await?;
    Ok(Json(AiStatus { ai_active, subscriptions }))
}

#[utoipa::path(
    post,
    path = "/api/users/{user_id}/segmentations",
    tag = "Subscriptions",
    params(("user_id" = i32, Path, description = "ID do Usuário")),
    responses(
        (status = 200, description = "Segmentação debitada da assinatura ativa", body = UserSubscription),
        (status = 409, description = "Sem assinatura ativa ou saldo esgotado")
    )
)]
pub async fn record_segmentation(
    State(app_state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let subscription = app_state.subscription_service.record_segmentation(user_id).await?;
    Ok(Json(subscription))
}
