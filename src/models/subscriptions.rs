// src/models/subscriptions.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- Planos Tiara AI ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    pub id: i32,
    #[schema(example = "Pro")]
    pub name: String,
    pub price: Decimal,
    pub segmentations_allowed: i32,
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewSubscriptionPlan {
    pub name: String,
    pub price: Decimal,
    pub segmentations_allowed: i32,
    pub description: Option<String>,
}

impl NewSubscriptionPlan {
    /// Catálogo inicial: Light, Pro e Premium.
    pub fn defaults() -> Vec<NewSubscriptionPlan> {
        [
            ("Light", 2900, 10, "10 segmentações por mês"),
            ("Pro", 6100, 25, "25 segmentações por mês"),
            ("Premium", 9800, 50, "50 segmentações por mês"),
        ]
        .into_iter()
        .map(|(name, price, allowed, description)| NewSubscriptionPlan {
            name: name.to_string(),
            price: Decimal::from(price),
            segmentations_allowed: allowed,
            description: Some(description.to_string()),
        })
        .collect()
    }
}

// --- Assinatura do usuário ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSubscription {
    pub id: i32,
    pub user_id: i32,
    pub plan_id: i32,
    pub order_id: i32,
    pub segmentations_used: i32,
    pub segmentations_allowed: i32,
    pub subscribed_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl UserSubscription {
    pub fn remaining(&self) -> i32 {
        (self.segmentations_allowed - self.segmentations_used).max(0)
    }
}

#[derive(Debug, Clone)]
pub struct NewUserSubscription {
    pub user_id: i32,
    pub plan_id: i32,
    pub order_id: i32,
    pub segmentations_allowed: i32,
    pub expires_at: Option<DateTime<Utc>>,
}
