// src/services/subscription_service.rs

use std::sync::Arc;

use chrono::Utc;

use crate::{
    common::error::AppError,
    db::{Store, UnitOfWork},
    models::subscriptions::{NewSubscriptionPlan, NewUserSubscription, SubscriptionPlan, UserSubscription},
};

#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn Store>,
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list_plans(&self) -> Result<Vec<SubscriptionPlan>, AppError> {
        let mut uow = self.store.begin().await?;
        let plans = uow.list_plans().await?;
        uow.rollback().await?;
        Ok(plans)
    }

    /// Cria Light, Pro e Premium se ainda não houver nenhum plano.
    pub async fn seed_default_plans(&self) -> Result<Vec<SubscriptionPlan>, AppError> {
        let mut uow = self.store.begin().await?;
        let existing = uow.list_plans().await?;
        if !existing.is_empty() {
            uow.rollback().await?;
            return Ok(existing);
        }

        let mut plans = Vec::new();
        for plan in NewSubscriptionPlan::defaults() {
            plans.push(uow.insert_plan(plan).await?);
        }
        uow.commit().await?;

        tracing::info!("✅ {} planos Tiara AI cadastrados", plans.len());
        Ok(plans)
    }

    // --- Assinatura pendente (checkout) ---
    // Só é ativada quando o pagamento do pedido é confirmado.
    pub async fn create_pending(&self, user_id: i32, plan_id: i32, order_id: i32) -> Result<UserSubscription, AppError> {
        let mut uow = self.store.begin().await?;
        let subscription = Self::create_pending_in(uow.as_mut(), user_id, plan_id, order_id).await?;
        uow.commit().await?;
        Ok(subscription)
    }

    pub async fn create_pending_in(
        uow: &mut dyn UnitOfWork,
        user_id: i32,
        plan_id: i32,
        order_id: i32,
    ) -> Result<UserSubscription, AppError> {
        let plan = uow.get_plan(plan_id).await?.ok_or(AppError::PlanNotFound(plan_id))?;

        if let Some(active) = uow.find_active_subscription(user_id).await? {
            return Err(AppError::SubscriptionAlreadyActive {
                user_id,
                plan_id: active.plan_id,
            });
        }

        uow.insert_user_subscription(NewUserSubscription {
            user_id,
            plan_id,
            order_id,
            segmentations_allowed: plan.segmentations_allowed,
            expires_at: None,
        })
        .await
    }

    // ===== ATIVAÇÃO =====
    // Ao final o usuário tem exatamente uma assinatura ativa: a do pedido.
    pub async fn activate(&self, user_id: i32, order_id: i32) -> Result<UserSubscription, AppError> {
        let mut uow = self.store.begin().await?;

        let mut subscription = uow
            .find_subscription_by_order(user_id, order_id)
            .await?
            .ok_or(AppError::SubscriptionNotFound(order_id))?;

        let deactivated = uow.deactivate_user_subscriptions(user_id).await?;
        uow.set_subscription_active(subscription.id, true).await?;
        uow.commit().await?;

        subscription.is_active = true;
        tracing::info!(
            "✅ Assinatura {} ativada para o usuário {} ({} desativada(s))",
            subscription.id,
            user_id,
            deactivated
        );
        Ok(subscription)
    }

    /// Consome uma segmentação da assinatura ativa.
    pub async fn record_segmentation(&self, user_id: i32) -> Result<UserSubscription, AppError> {
        let mut uow = self.store.begin().await?;
        let subscription = Self::record_segmentation_in(uow.as_mut(), user_id).await?;
        uow.commit().await?;
        Ok(subscription)
    }

    pub async fn record_segmentation_in(uow: &mut dyn UnitOfWork, user_id: i32) -> Result<UserSubscription, AppError> {
        let mut subscription = uow
            .find_active_subscription(user_id)
            .await?
            .ok_or(AppError::SegmentationQuotaExhausted(user_id))?;

        if subscription.segmentations_used >= subscription.segmentations_allowed {
            return Err(AppError::SegmentationQuotaExhausted(user_id));
        }

        uow.increment_segmentations_used(subscription.id).await?;
        subscription.segmentations_used += 1;
        Ok(subscription)
    }

    /// "Tiara AI ativo" é derivado: existe assinatura ativa, não expirada e com saldo.
    pub async fn is_ai_active(&self, user_id: i32) -> Result<bool, AppError> {
        let mut uow = self.store.begin().await?;
        let active = uow.find_active_subscription(user_id).await?;
        uow.rollback().await?;

        let now = Utc::now();
        Ok(active.is_some_and(|s| s.remaining() > 0 && s.expires_at.is_none_or(|at| at > now)))
    }

    pub async fn list_user_subscriptions(&self, user_id: i32) -> Result<Vec<UserSubscription>, AppError> {
        let mut uow = self.store.begin().await?;
        let subscriptions = uow.list_user_subscriptions(user_id).await?;
        uow.rollback().await?;
        Ok(subscriptions)
    }
}
