// src/models/training.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- Treinamentos odontológicos ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DentalTraining {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub price: Decimal,
    /// `None` = vagas ilimitadas.
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewDentalTraining {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub price: Decimal,
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DentalTrainingRegistration {
    pub id: i32,
    pub user_id: i32,
    #[serde(rename = "trainingId")]
    #[sqlx(rename = "dental_training_id")]
    pub training_id: i32,
    pub order_id: Option<i32>,
    pub confirmed: bool,
    pub registered_at: DateTime<Utc>,
}

// --- Eventos ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventRegistration {
    pub id: i32,
    pub user_id: i32,
    pub event_id: i32,
    pub registered_at: DateTime<Utc>,
}
