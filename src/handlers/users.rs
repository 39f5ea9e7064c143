// src/handlers/users.rs

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
    models::users::{NewUser, User},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(email(message = "O e-mail é inválido."))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório."))]
    pub first_name: String,
    pub middle_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "O sobrenome é obrigatório."))]
    pub last_name: String,
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = User),
        (status = 409, description = "E-mail já cadastrado")
    )
)]
pub async fn register_user(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = app_state
        .user_service
        .register_user(NewUser {
            email: payload.email,
            first_name: payload.first_name,
            middle_name: payload.middle_name,
            last_name: payload.last_name,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    tag = "Users",
    params(("user_id" = i32, Path, description = "ID do Usuário")),
    responses(
        (status = 200, description = "Usuário", body = User),
        (status = 404, description = "Usuário não encontrado")
    )
)]
pub async fn get_user(
    State(app_state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.user_service.get_user(user_id).await?;
    Ok(Json(user))
}
