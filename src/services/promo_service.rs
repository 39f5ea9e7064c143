// src/services/promo_service.rs

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::{Store, UnitOfWork},
    models::promo::{NewPromoCode, PromoCode, PromoValidation, UserPromoCodeUsage, MSG_INVALID},
};

#[derive(Clone)]
pub struct PromoService {
    store: Arc<dyn Store>,
}

impl PromoService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    // --- VALIDAR (não altera nada) ---
    pub async fn validate(&self, code: &str, order_amount: Decimal, user_id: i32) -> Result<PromoValidation, AppError> {
        let mut uow = self.store.begin().await?;
        let result = Self::validate_in(uow.as_mut(), code, order_amount, user_id).await?;
        uow.rollback().await?;
        Ok(result)
    }

    pub async fn validate_in(
        uow: &mut dyn UnitOfWork,
        code: &str,
        order_amount: Decimal,
        user_id: i32,
    ) -> Result<PromoValidation, AppError> {
        let Some(promo) = uow.find_promo_by_code(code.trim()).await? else {
            return Ok(PromoValidation::rejected(MSG_INVALID));
        };

        let already_used = uow.has_used_promo(user_id, promo.id).await?;
        Ok(promo.evaluate(order_amount, already_used, Utc::now()))
    }

    // --- RESGATAR ---
    pub async fn redeem(&self, user_id: i32, promo_code_id: i32, order_id: Option<i32>) -> Result<UserPromoCodeUsage, AppError> {
        let mut uow = self.store.begin().await?;

        let promo = uow
            .get_promo(promo_code_id)
            .await?
            .ok_or_else(|| AppError::PromoCodeNotFound(promo_code_id.to_string()))?;

        if uow.has_used_promo(user_id, promo.id).await? {
            return Err(AppError::PromoCodeAlreadyUsed { user_id, promo_code_id });
        }

        uow.increment_promo_uses(promo.id).await?;
        let usage = uow.insert_promo_usage(user_id, promo.id, order_id).await?;
        uow.commit().await?;

        tracing::info!("✅ Cupom {} resgatado pelo usuário {}", promo.code, user_id);
        Ok(usage)
    }

    // --- ADMINISTRAÇÃO ---

    pub async fn create_promo_code(&self, mut new: NewPromoCode) -> Result<PromoCode, AppError> {
        new.code = new.code.trim().to_string();
        if new.end_date < new.start_date {
            return Err(AppError::PromoCodeRejected("a data final é anterior à inicial".into()));
        }
        if new.discount_percent <= Decimal::ZERO || new.discount_percent > Decimal::ONE_HUNDRED {
            return Err(AppError::PromoCodeRejected("o desconto deve estar entre 0 e 100%".into()));
        }

        let mut uow = self.store.begin().await?;
        if uow.find_promo_by_code(&new.code).await?.is_some() {
            return Err(AppError::PromoCodeAlreadyExists(new.code));
        }
        let promo = uow.insert_promo(new).await?;
        uow.commit().await?;
        Ok(promo)
    }

    pub async fn get_promo_code(&self, code: &str) -> Result<PromoCode, AppError> {
        let mut uow = self.store.begin().await?;
        let promo = uow
            .find_promo_by_code(code.trim())
            .await?
            .ok_or_else(|| AppError::PromoCodeNotFound(code.to_string()))?;
        uow.rollback().await?;
        Ok(promo)
    }

    pub async fn list_promo_codes(&self) -> Result<Vec<PromoCode>, AppError> {
        let mut uow = self.store.begin().await?;
        let promos = uow.list_promos().await?;
        uow.rollback().await?;
        Ok(promos)
    }
}
