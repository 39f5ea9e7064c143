// src/services/order_service.rs

use std::sync::Arc;

use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    db::{Store, UnitOfWork},
    models::orders::{
        Checkout, ConfirmationReceipt, LineItemKind, Order, OrderDraft, OrderItemDraft, OrderStatus,
    },
    services::{
        catalog_service::CatalogService, notification::ConfirmationNotifier, promo_service::PromoService,
        subscription_service::SubscriptionService, training_service::TrainingService,
    },
};

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn Store>,
    notifier: ConfirmationNotifier,
}

impl OrderService {
    pub fn new(store: Arc<dyn Store>, notifier: ConfirmationNotifier) -> Self {
        Self { store, notifier }
    }

    pub async fn get_order(&self, order_id: i32) -> Result<Order, AppError> {
        let mut uow = self.store.begin().await?;
        let order = uow.get_order(order_id).await?.ok_or(AppError::OrderNotFound(order_id))?;
        uow.rollback().await?;
        Ok(order)
    }

    // ===== 1. CHECKOUT =====
    // Decodifica os IDs legados, congela nomes e preços e grava o pedido `Pending`.
    pub async fn create_order(&self, checkout: Checkout) -> Result<Order, AppError> {
        if checkout.lines.is_empty() {
            let mut errors = ValidationErrors::new();
            errors.add("lines", ValidationError::new("empty"));
            return Err(AppError::ValidationError(errors));
        }
        if checkout.lines.iter().any(|line| line.quantity <= 0) {
            let mut errors = ValidationErrors::new();
            errors.add("quantity", ValidationError::new("range"));
            return Err(AppError::ValidationError(errors));
        }

        let guest_label = checkout.shipping.shipping_email.clone();
        let mut uow = self.store.begin().await?;

        if let Some(user_id) = checkout.user_id {
            uow.get_user(user_id).await?.ok_or(AppError::UserNotFound(user_id))?;
        }

        let mut items = Vec::with_capacity(checkout.lines.len());
        for line in &checkout.lines {
            let kind = LineItemKind::from_legacy_product_id(line.product_id, line.variant_id);

            let item = match kind {
                LineItemKind::Product { product_id, .. } => {
                    let product = uow
                        .get_product(product_id)
                        .await?
                        .filter(|p| p.is_active)
                        .ok_or(AppError::ProductNotFound(product_id))?;
                    let variant_id =
                        CatalogService::resolve_variant(&product, line.variant_id, line.product_name.as_deref())?;

                    OrderItemDraft {
                        kind: LineItemKind::Product { product_id, variant_id },
                        quantity: line.quantity,
                        unit_price: product.price,
                        product_name: Some(line.product_name.clone().unwrap_or_else(|| product.name.clone())),
                        product_image: product.logo_url.clone(),
                    }
                }
                LineItemKind::AiSubscription { plan_id } => {
                    if checkout.user_id.is_none() {
                        return Err(AppError::GuestCheckoutNotAllowed(guest_label));
                    }
                    let plan = uow.get_plan(plan_id).await?.ok_or(AppError::PlanNotFound(plan_id))?;
                    OrderItemDraft {
                        kind,
                        quantity: line.quantity,
                        unit_price: plan.price,
                        product_name: Some(format!("Tiara AI {}", plan.name)),
                        product_image: None,
                    }
                }
                LineItemKind::TrainingPackage { training_id } => {
                    if checkout.user_id.is_none() {
                        return Err(AppError::GuestCheckoutNotAllowed(guest_label));
                    }
                    // Uma inscrição por usuário e treinamento: uma vaga por linha.
                    if line.quantity != 1 {
                        let mut errors = ValidationErrors::new();
                        errors.add("quantity", ValidationError::new("one_seat_per_training"));
                        return Err(AppError::ValidationError(errors));
                    }
                    let training = uow
                        .get_training(training_id)
                        .await?
                        .ok_or(AppError::TrainingNotFound(training_id))?;
                    OrderItemDraft {
                        kind,
                        quantity: line.quantity,
                        unit_price: training.price,
                        product_name: Some(training.title),
                        product_image: None,
                    }
                }
            };
            items.push(item);
        }

        let shipping = if items.iter().any(|item| item.kind.is_physical()) {
            self.notifier.settings().shipping_fee
        } else {
            Decimal::ZERO
        };
        let mut total = items
            .iter()
            .try_fold(shipping, |acc, item| {
                item.unit_price
                    .checked_mul(Decimal::from(item.quantity))
                    .and_then(|line| acc.checked_add(line))
            })
            .ok_or_else(|| {
                let mut errors = ValidationErrors::new();
                errors.add("total", ValidationError::new("overflow"));
                AppError::ValidationError(errors)
            })?;

        let mut promo_code_id = None;
        if let Some(code) = checkout.promo_code.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            let user_id = checkout
                .user_id
                .ok_or_else(|| AppError::GuestCheckoutNotAllowed(guest_label.clone()))?;
            let validation = PromoService::validate_in(uow.as_mut(), code, total, user_id).await?;
            if !validation.is_valid {
                return Err(AppError::PromoCodeRejected(validation.message));
            }
            total = validation.final_amount;
            promo_code_id = validation.promo_code_id;
        }

        let order = uow
            .insert_order(OrderDraft {
                user_id: checkout.user_id,
                total_amount: total,
                promo_code_id,
                shipping: checkout.shipping,
                items,
            })
            .await?;

        // Reservas pendentes: só valem depois da confirmação.
        if let Some(user_id) = order.user_id {
            for item in &order.items {
                match item.kind {
                    LineItemKind::TrainingPackage { training_id } => {
                        TrainingService::register_pending(uow.as_mut(), user_id, training_id, Some(order.id)).await?;
                    }
                    LineItemKind::AiSubscription { plan_id } => {
                        SubscriptionService::create_pending_in(uow.as_mut(), user_id, plan_id, order.id).await?;
                    }
                    LineItemKind::Product { .. } => {}
                }
            }
        }

        uow.commit().await?;
        tracing::info!("🛒 Pedido {} criado ({} itens, total {})", order.id, order.items.len(), order.total_amount);
        Ok(order)
    }

    // ===== 2. CONFIRMAÇÃO =====
    // Reserva estoque e vagas numa única transação; o e-mail sai depois do commit.
    pub async fn confirm_order(&self, order_id: i32) -> Result<ConfirmationReceipt, AppError> {
        let mut uow = self.store.begin().await?;

        let mut order = uow.get_order(order_id).await?.ok_or(AppError::OrderNotFound(order_id))?;
        if order.items.is_empty() {
            return Err(AppError::EmptyOrder(order_id));
        }
        order.status.ensure_transition(OrderStatus::Confirmed)?;

        for item in &order.items {
            match item.kind {
                LineItemKind::Product { product_id, variant_id } => {
                    let mut product = uow
                        .get_product(product_id)
                        .await?
                        .ok_or(AppError::ProductNotFound(product_id))?;

                    if product.quantity < item.quantity {
                        return Err(AppError::InsufficientStock {
                            product_id,
                            available: product.quantity,
                            requested: item.quantity,
                        });
                    }
                    CatalogService::adjust_stock(uow.as_mut(), &mut product, -item.quantity, variant_id).await?;
                }
                LineItemKind::AiSubscription { .. } => {
                    // Ativada pelo callback do pagamento.
                }
                LineItemKind::TrainingPackage { training_id } => {
                    let training = uow
                        .get_training(training_id)
                        .await?
                        .ok_or(AppError::TrainingNotFound(training_id))?;

                    if let Some(capacity) = training.capacity {
                        if capacity < item.quantity {
                            return Err(AppError::InsufficientCapacity {
                                training_id,
                                available: capacity,
                                requested: item.quantity,
                            });
                        }
                        uow.update_training_capacity(training_id, Some(capacity - item.quantity)).await?;
                    }

                    let user_id = order
                        .user_id
                        .ok_or_else(|| AppError::GuestCheckoutNotAllowed(order.shipping.shipping_email.clone()))?;
                    if !uow.set_registration_confirmed(order.id, user_id, training_id, true).await? {
                        return Err(AppError::RegistrationNotFound { order_id, user_id });
                    }
                }
            }
        }

        uow.update_order_status(order.id, OrderStatus::Confirmed).await?;
        let user = match order.user_id {
            Some(user_id) => uow.get_user(user_id).await?,
            None => None,
        };
        uow.commit().await?;
        order.status = OrderStatus::Confirmed;
        tracing::info!("✅ Pedido {} confirmado", order.id);

        if let (Some(user_id), None) = (order.user_id, &user) {
            tracing::warn!("⚠️ Usuário {} do pedido {} não encontrado; usando os dados de entrega", user_id, order.id);
        }
        let notification_sent = match self.notifier.render_order_confirmation(&order, user.as_ref()) {
            Ok(email) => self.notifier.dispatch(email).await,
            Err(e) => {
                tracing::warn!("⚠️ E-mail do pedido {} não foi montado: {}", order.id, e);
                false
            }
        };

        Ok(ConfirmationReceipt {
            order_id: order.id,
            status: order.status,
            notification_sent,
        })
    }

    // ===== 3. MUDANÇA DE STATUS =====
    pub async fn update_order_status(&self, order_id: i32, new_status: OrderStatus) -> Result<Order, AppError> {
        match new_status {
            OrderStatus::Confirmed => {
                self.confirm_order(order_id).await?;
                self.get_order(order_id).await
            }
            OrderStatus::Cancelled => self.cancel_order(order_id).await,
            OrderStatus::Pending => {
                // Nenhum status volta para Pending; a mensagem de erro diz de onde.
                let order = self.get_order(order_id).await?;
                order.status.ensure_transition(OrderStatus::Pending)?;
                Ok(order)
            }
        }
    }

    pub async fn cancel_order(&self, order_id: i32) -> Result<Order, AppError> {
        let mut uow = self.store.begin().await?;

        let mut order = uow.get_order(order_id).await?.ok_or(AppError::OrderNotFound(order_id))?;
        let previous = order.status;
        previous.ensure_transition(OrderStatus::Cancelled)?;

        // Pending não reservou nada.
        if previous == OrderStatus::Confirmed {
            Self::release_reservations(uow.as_mut(), &order).await?;
        }

        uow.update_order_status(order.id, OrderStatus::Cancelled).await?;
        uow.commit().await?;

        order.status = OrderStatus::Cancelled;
        tracing::info!("🚫 Pedido {} cancelado (estava {})", order.id, previous);
        Ok(order)
    }

    async fn release_reservations(uow: &mut dyn UnitOfWork, order: &Order) -> Result<(), AppError> {
        for item in &order.items {
            match item.kind {
                LineItemKind::Product { product_id, variant_id } => match uow.get_product(product_id).await? {
                    Some(mut product) => {
                        CatalogService::adjust_stock(uow, &mut product, item.quantity, variant_id).await?;
                    }
                    None => {
                        tracing::warn!(
                            "⚠️ Produto {} do pedido {} não existe mais; estoque não devolvido",
                            product_id,
                            order.id
                        );
                    }
                },
                LineItemKind::TrainingPackage { training_id } => {
                    match uow.get_training(training_id).await? {
                        Some(training) => {
                            if let Some(capacity) = training.capacity {
                                uow.update_training_capacity(training_id, Some(capacity + item.quantity)).await?;
                            }
                        }
                        None => tracing::warn!(
                            "⚠️ Treinamento {} do pedido {} não existe mais; vagas não devolvidas",
                            training_id,
                            order.id
                        ),
                    }
                    if let Some(user_id) = order.user_id {
                        uow.set_registration_confirmed(order.id, user_id, training_id, false).await?;
                    }
                }
                LineItemKind::AiSubscription { .. } => {}
            }
        }
        Ok(())
    }
}
