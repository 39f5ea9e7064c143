// src/models/payments.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i32,
    pub order_id: i32,
    #[schema(example = "Card")]
    pub method: String,
    /// Status como o provedor envia ("Pending", "success", "failed"...).
    pub status: String,
    pub amount: Decimal,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order_id: i32,
    pub method: String,
    pub status: String,
    pub amount: Decimal,
    pub transaction_id: String,
    pub notes: Option<String>,
}

/// Interpretação do status recebido no callback do provedor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStatus {
    Success,
    Failed,
    Other,
}

impl ProviderStatus {
    pub fn classify(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "success" | "succeeded" | "paid" => ProviderStatus::Success,
            "failed" | "declined" | "cancelled" | "canceled" | "voided" => ProviderStatus::Failed,
            _ => ProviderStatus::Other,
        }
    }
}
