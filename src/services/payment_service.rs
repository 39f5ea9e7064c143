// src/services/payment_service.rs

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::error::{AppError, ErrorKind},
    db::Store,
    models::{
        orders::OrderStatus,
        payments::{NewPayment, Payment, ProviderStatus},
    },
    services::{order_service::OrderService, promo_service::PromoService, subscription_service::SubscriptionService},
};

/// O que o callback fez com o pedido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum OrderEffect {
    Confirmed,
    AlreadyConfirmed,
    Cancelled,
    AlreadyCancelled,
    Unchanged,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCallbackOutcome {
    pub payment_id: i32,
    pub order_id: i32,
    pub payment_status: String,
    pub order_effect: OrderEffect,
    pub notification_sent: bool,
}

#[derive(Clone)]
pub struct PaymentService {
    store: Arc<dyn Store>,
    orders: OrderService,
    subscriptions: SubscriptionService,
    promos: PromoService,
}

impl PaymentService {
    pub fn new(
        store: Arc<dyn Store>,
        orders: OrderService,
        subscriptions: SubscriptionService,
        promos: PromoService,
    ) -> Self {
        Self { store, orders, subscriptions, promos }
    }

    // --- Intenção de pagamento ---
    // O provedor trabalha em centavos.
    pub async fn record_intention(
        &self,
        order_id: i32,
        transaction_id: String,
        amount_cents: i64,
        method: String,
        status: String,
    ) -> Result<Payment, AppError> {
        let mut uow = self.store.begin().await?;
        uow.get_order(order_id).await?.ok_or(AppError::OrderNotFound(order_id))?;

        let payment = uow
            .insert_payment(NewPayment {
                order_id,
                method,
                status,
                amount: Decimal::new(amount_cents, 2),
                transaction_id,
                notes: None,
            })
            .await?;
        uow.commit().await?;

        tracing::info!("💳 Pagamento {} registrado para o pedido {}", payment.id, order_id);
        Ok(payment)
    }

    // ===== CALLBACK DO PROVEDOR =====
    // O status do pagamento é gravado primeiro, em transação própria; o pedido
    // é conduzido depois pelas operações de pedido.
    pub async fn handle_callback(&self, transaction_id: &str, status: &str) -> Result<PaymentCallbackOutcome, AppError> {
        let mut uow = self.store.begin().await?;
        let payment = uow
            .find_payment_by_transaction(transaction_id)
            .await?
            .ok_or_else(|| AppError::PaymentNotFound(transaction_id.to_string()))?;
        uow.update_payment_status(payment.id, status).await?;
        let order = uow
            .get_order(payment.order_id)
            .await?
            .ok_or(AppError::OrderNotFound(payment.order_id))?;
        uow.commit().await?;

        tracing::info!("💳 Pagamento {} ({}) agora está '{}'", payment.id, transaction_id, status);

        let mut notification_sent = false;
        let order_effect = match ProviderStatus::classify(status) {
            ProviderStatus::Success if order.status == OrderStatus::Confirmed => OrderEffect::AlreadyConfirmed,
            ProviderStatus::Success => {
                let receipt = self.orders.confirm_order(order.id).await?;
                notification_sent = receipt.notification_sent;

                if let Some(user_id) = order.user_id {
                    if order.has_subscription_items() {
                        self.subscriptions.activate(user_id, order.id).await?;
                    }
                    if let Some(promo_code_id) = order.promo_code_id {
                        // O pedido já está confirmado; o resgate não o desfaz.
                        if let Err(e) = self.promos.redeem(user_id, promo_code_id, Some(order.id)).await {
                            match e.kind() {
                                ErrorKind::Infrastructure => tracing::error!(
                                    "🔥 Falha ao resgatar o cupom {} do pedido {}: {:?}",
                                    promo_code_id,
                                    order.id,
                                    e
                                ),
                                _ => tracing::warn!(
                                    "⚠️ Cupom {} do pedido {} não resgatado: {}",
                                    promo_code_id,
                                    order.id,
                                    e
                                ),
                            }
                        }
                    }
                }
                OrderEffect::Confirmed
            }
            ProviderStatus::Failed if order.status == OrderStatus::Cancelled => OrderEffect::AlreadyCancelled,
            ProviderStatus::Failed => {
                self.orders.cancel_order(order.id).await?;
                OrderEffect::Cancelled
            }
            ProviderStatus::Other => OrderEffect::Unchanged,
        };

        Ok(PaymentCallbackOutcome {
            payment_id: payment.id,
            order_id: order.id,
            payment_status: status.to_string(),
            order_effect,
            notification_sent,
        })
    }
}
