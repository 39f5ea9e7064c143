// src/models/orders.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::common::error::AppError;
use crate::models::payments::Payment;

// Faixas de IDs legados que o front-end ainda envia no checkout.
pub const AI_PLAN_ID_FIRST: i32 = 1_000_000;
pub const AI_PLAN_ID_LAST: i32 = 1_000_003;
pub const TRAINING_ID_OFFSET: i32 = 2_000_000;

// --- Status (máquina de estados fechada) ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl OrderStatus {
    /// Pending → Confirmed, Pending → Cancelled, Confirmed → Cancelled.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Confirmed)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Confirmed, OrderStatus::Cancelled)
        )
    }

    pub fn ensure_transition(self, next: OrderStatus) -> Result<(), AppError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(AppError::InvalidStatusTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

// Os chamadores (webhook, painel) ainda mandam texto livre.
impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            _ => Err(AppError::UnknownOrderStatus(raw.to_string())),
        }
    }
}

// --- Tipo da linha do pedido ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LineItemKind {
    #[serde(rename_all = "camelCase")]
    Product { product_id: i32, variant_id: Option<i32> },
    #[serde(rename_all = "camelCase")]
    AiSubscription { plan_id: i32 },
    #[serde(rename_all = "camelCase")]
    TrainingPackage { training_id: i32 },
}

impl LineItemKind {
    /// Decodifica o ID "de produto" enviado pelo carrinho antigo.
    /// Só é usado no checkout; depois disso o tipo fica gravado na linha.
    pub fn from_legacy_product_id(product_id: i32, variant_id: Option<i32>) -> Self {
        if (AI_PLAN_ID_FIRST..=AI_PLAN_ID_LAST).contains(&product_id) {
            LineItemKind::AiSubscription { plan_id: product_id - AI_PLAN_ID_FIRST + 1 }
        } else if product_id >= TRAINING_ID_OFFSET {
            LineItemKind::TrainingPackage { training_id: product_id - TRAINING_ID_OFFSET }
        } else {
            LineItemKind::Product { product_id, variant_id }
        }
    }

    pub fn is_physical(&self) -> bool {
        matches!(self, LineItemKind::Product { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "line_item_kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineItemKindTag {
    Product,
    AiSubscription,
    TrainingPackage,
}

// --- Itens do pedido ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub kind: LineItemKind,
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(example = "450.00")]
    pub unit_price: Decimal,
    pub product_name: Option<String>,
    pub product_image: Option<String>,
}

/// Linha como está na tabela `order_items`.
#[derive(Debug, Clone, FromRow)]
pub struct OrderItemRow {
    pub id: i32,
    pub order_id: i32,
    pub kind: LineItemKindTag,
    pub product_id: Option<i32>,
    pub variant_id: Option<i32>,
    pub plan_id: Option<i32>,
    pub training_id: Option<i32>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub product_name: Option<String>,
    pub product_image: Option<String>,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = AppError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let kind = match (row.kind, row.product_id, row.plan_id, row.training_id) {
            (LineItemKindTag::Product, Some(product_id), _, _) => LineItemKind::Product {
                product_id,
                variant_id: row.variant_id,
            },
            (LineItemKindTag::AiSubscription, _, Some(plan_id), _) => {
                LineItemKind::AiSubscription { plan_id }
            }
            (LineItemKindTag::TrainingPackage, _, _, Some(training_id)) => {
                LineItemKind::TrainingPackage { training_id }
            }
            _ => {
                return Err(anyhow::anyhow!(
                    "Linha {} do pedido {} sem a referência do seu tipo",
                    row.id,
                    row.order_id
                )
                .into())
            }
        };

        Ok(OrderItem {
            id: row.id,
            order_id: row.order_id,
            kind,
            quantity: row.quantity,
            unit_price: row.unit_price,
            product_name: row.product_name,
            product_image: row.product_image,
        })
    }
}

// --- Endereço de entrega (também identifica o cliente sem conta) ---
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_postal_code: String,
    pub shipping_country: String,
    pub shipping_phone: String,
    #[schema(example = "cliente@exemplo.com")]
    pub shipping_email: String,
    pub shipping_first_name: String,
    pub shipping_middle_name: String,
    pub shipping_last_name: String,
}

// --- Pedido ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[schema(example = 1)]
    pub id: i32,
    pub user_id: Option<i32>,
    pub status: OrderStatus,
    #[schema(example = "1050.00")]
    pub total_amount: Decimal,
    pub promo_code_id: Option<i32>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub shipping: ShippingDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    #[sqlx(skip)]
    pub items: Vec<OrderItem>,
    #[sqlx(skip)]
    pub payments: Vec<Payment>,
}

impl Order {
    pub fn has_physical_items(&self) -> bool {
        self.items.iter().any(|item| item.kind.is_physical())
    }

    pub fn has_training_items(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item.kind, LineItemKind::TrainingPackage { .. }))
    }

    pub fn has_subscription_items(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item.kind, LineItemKind::AiSubscription { .. }))
    }
}

// --- Rascunhos (entrada do repositório) ---

#[derive(Debug, Clone)]
pub struct OrderItemDraft {
    pub kind: LineItemKind,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub product_name: Option<String>,
    pub product_image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub user_id: Option<i32>,
    pub total_amount: Decimal,
    pub promo_code_id: Option<i32>,
    pub shipping: ShippingDetails,
    pub items: Vec<OrderItemDraft>,
}

// --- Checkout (entrada do serviço) ---

#[derive(Debug, Clone)]
pub struct CheckoutLine {
    /// ID como o carrinho envia (pode estar numa faixa legada).
    pub product_id: i32,
    pub variant_id: Option<i32>,
    pub quantity: i32,
    /// Nome exibido no carrinho, ex.: "Coroa Pediátrica, UpperRight, S2".
    pub product_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Checkout {
    pub user_id: Option<i32>,
    pub shipping: ShippingDetails,
    pub promo_code: Option<String>,
    pub lines: Vec<CheckoutLine>,
}

/// Resultado da confirmação: o commit do estoque é o que vale;
/// o e-mail é só informativo.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationReceipt {
    pub order_id: i32,
    pub status: OrderStatus,
    pub notification_sent: bool,
}
