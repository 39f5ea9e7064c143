// src/handlers/registrations.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::training::{
        DentalTraining, DentalTrainingRegistration, Event, EventRegistration, NewDentalTraining, NewEvent,
    },
};

// ---
// Cadastro
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrainingPayload {
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    #[schema(example = "2500.00")]
    pub price: Decimal,
    /// Vazio = vagas ilimitadas.
    #[validate(range(min = 0, message = "As vagas não podem ser negativas."))]
    pub capacity: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventPayload {
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    #[validate(range(min = 0, message = "As vagas não podem ser negativas."))]
    pub capacity: Option<i32>,
}

#[utoipa::path(
    post,
    path = "/api/trainings",
    tag = "Trainings",
    request_body = CreateTrainingPayload,
    responses((status = 201, description = "Treinamento criado", body = DentalTraining))
)]
pub async fn create_training(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateTrainingPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let training = app_state
        .training_service
        .create_training(NewDentalTraining {
            title: payload.title,
            description: payload.description,
            date: payload.date,
            location: payload.location,
            price: payload.price,
            capacity: payload.capacity,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(training)))
}

#[utoipa::path(
    post,
    path = "/api/events",
    tag = "Trainings",
    request_body = CreateEventPayload,
    responses((status = 201, description = "Evento criado", body = Event))
)]
pub async fn create_event(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateEventPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let event = app_state
        .training_service
        .create_event(NewEvent {
            title: payload.title,
            description: payload.description,
            date: payload.date,
            location: payload.location,
            capacity: payload.capacity,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

// ---
// Inscrições
// ---

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRegistrationPayload {
    pub user_id: i32,
    pub order_id: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventRegistrationPayload {
    pub user_id: i32,
}

#[utoipa::path(
    post,
    path = "/api/trainings/{training_id}/registrations",
    tag = "Trainings",
    request_body = TrainingRegistrationPayload,
    params(("training_id" = i32, Path, description = "ID do Treinamento")),
    responses(
        (status = 201, description = "Inscrição pendente criada", body = DentalTrainingRegistration),
        (status = 409, description = "Usuário já inscrito")
    )
)]
pub async fn register_for_training(
    State(app_state): State<AppState>,
    Path(training_id): Path<i32>,
    Json(payload): Json<TrainingRegistrationPayload>,
) -> Result<impl IntoResponse, AppError> {
    let registration = app_state
        .training_service
        .register_for_training(payload.user_id, training_id, payload.order_id)
        .await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

#[utoipa::path(
    post,
    path = "/api/events/{event_id}/registrations",
    tag = "Trainings",
    request_body = EventRegistrationPayload,
    params(("event_id" = i32, Path, description = "ID do Evento")),
    responses(
        (status = 201, description = "Inscrição no evento", body = EventRegistration),
        (status = 409, description = "Usuário já inscrito ou evento lotado")
    )
)]
pub async fn register_for_event(
    State(app_state): State<AppState>,
    Path(event_id): Path<i32>,
    Json(payload): Json<EventRegistrationPayload>,
) -> Result<impl IntoResponse, AppError> {
    let registration = app_state
        .training_service
        .register_for_event(payload.user_id, event_id)
        .await?;
    Ok((StatusCode::CREATED, Json(registration)))
}
