// src/models/promo.rs

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// Mensagens exibidas ao cliente no carrinho.
pub const MSG_INVALID: &str = "Invalid promo code";
pub const MSG_ALREADY_USED: &str = "You have already used this promo code.";
pub const MSG_INACTIVE: &str = "Promo code is no longer active";
pub const MSG_EXPIRED: &str = "Promo code has expired";
pub const MSG_EXHAUSTED: &str = "Promo code has reached its maximum usage limit";
pub const MSG_APPLIED: &str = "Promo code applied successfully";
pub const MSG_AMOUNT_OUT_OF_RANGE: &str = "Order amount is out of range";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromoCode {
    pub id: i32,
    #[schema(example = "TIARA10")]
    pub code: String,
    /// Percentual (10 = 10%).
    pub discount_percent: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub max_uses: Option<i32>,
    pub current_uses: i32,
    pub minimum_order_amount: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl PromoCode {
    /// Aplica as regras na ordem em que o cliente deve ver a recusa.
    /// Não consulta o banco: `already_used` vem do chamador.
    pub fn evaluate(&self, order_amount: Decimal, already_used: bool, now: DateTime<Utc>) -> PromoValidation {
        if already_used {
            return PromoValidation::rejected(MSG_ALREADY_USED);
        }
        if !self.is_active {
            return PromoValidation::rejected(MSG_INACTIVE);
        }
        if now < self.start_date || now > self.end_date {
            return PromoValidation::rejected(MSG_EXPIRED);
        }
        if let Some(max) = self.max_uses {
            if self.current_uses >= max {
                return PromoValidation::rejected(MSG_EXHAUSTED);
            }
        }
        if let Some(minimum) = self.minimum_order_amount {
            if order_amount < minimum {
                return PromoValidation::rejected(format!(
                    "Minimum order amount of {minimum} EGP required"
                ));
            }
        }

        let Some(discount) = self.discount_for(order_amount) else {
            return PromoValidation::rejected(MSG_AMOUNT_OUT_OF_RANGE);
        };
        let Some(final_amount) = order_amount.checked_sub(discount) else {
            return PromoValidation::rejected(MSG_AMOUNT_OUT_OF_RANGE);
        };
        PromoValidation {
            is_valid: true,
            message: MSG_APPLIED.to_string(),
            discount_amount: discount,
            final_amount: final_amount.max(Decimal::ZERO),
            promo_code_id: Some(self.id),
        }
    }

    /// `None` quando o valor não cabe em `Decimal`.
    pub fn discount_for(&self, order_amount: Decimal) -> Option<Decimal> {
        let raw = order_amount
            .checked_mul(self.discount_percent)?
            .checked_div(Decimal::ONE_HUNDRED)?;
        Some(
            raw.max(Decimal::ZERO)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

#[derive(Debug, Clone)]
pub struct NewPromoCode {
    pub code: String,
    pub discount_percent: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub max_uses: Option<i32>,
    pub minimum_order_amount: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPromoCodeUsage {
    pub id: i32,
    pub user_id: i32,
    pub promo_code_id: i32,
    pub order_id: Option<i32>,
    pub used_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromoValidation {
    pub is_valid: bool,
    pub message: String,
    pub discount_amount: Decimal,
    pub final_amount: Decimal,
    pub promo_code_id: Option<i32>,
}

impl PromoValidation {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
            discount_amount: Decimal::ZERO,
            final_amount: Decimal::ZERO,
            promo_code_id: None,
        }
    }
}
