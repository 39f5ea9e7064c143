// src/db/promo_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::promo::{NewPromoCode, PromoCode, UserPromoCodeUsage},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct PromoRepository;

impl PromoRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_code<'e, E>(&self, executor: E, code: &str) -> Result<Option<PromoCode>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let promo = sqlx::query_as::<_, PromoCode>(
            r#"
            SELECT id, code, discount_percent, start_date, end_date, is_active,
                   max_uses, current_uses, minimum_order_amount, created_at
            FROM promo_codes
            WHERE code = $1
            "#,
        )
            .bind(code)
            .fetch_optional(executor)
            .await?;
        Ok(promo)
    }

    // Usado no resgate: trava o contador de usos.
    pub async fn find_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<PromoCode>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let promo = sqlx::query_as::<_, PromoCode>(
            r#"
            SELECT id, code, discount_percent, start_date, end_date, is_active,
                   max_uses, current_uses, minimum_order_amount, created_at
            FROM promo_codes
            WHERE id = $1
            FOR UPDATE
            "#,
        )
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(promo)
    }

    pub async fn list_all<'e, E>(&self, executor: E) -> Result<Vec<PromoCode>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let promos = sqlx::query_as::<_, PromoCode>(
            r#"
            SELECT id, code, discount_percent, start_date, end_date, is_active,
                   max_uses, current_uses, minimum_order_amount, created_at
            FROM promo_codes
            ORDER BY created_at DESC, id DESC
            "#,
        )
            .fetch_all(executor)
            .await?;
        Ok(promos)
    }

    pub async fn insert<'e, E>(&self, executor: E, new: NewPromoCode) -> Result<PromoCode, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PromoCode>(
            r#"
            INSERT INTO promo_codes (code, discount_percent, start_date, end_date, is_active, max_uses, minimum_order_amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, code, discount_percent, start_date, end_date, is_active,
                      max_uses, current_uses, minimum_order_amount, created_at
            "#,
        )
            .bind(&new.code)
            .bind(new.discount_percent)
            .bind(new.start_date)
            .bind(new.end_date)
            .bind(new.is_active)
            .bind(new.max_uses)
            .bind(new.minimum_order_amount)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::PromoCodeAlreadyExists(new.code.clone());
                    }
                }
                e.into()
            })
    }

    pub async fn has_usage<'e, E>(&self, executor: E, user_id: i32, promo_code_id: i32) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_promo_code_usages WHERE user_id = $1 AND promo_code_id = $2)",
        )
            .bind(user_id)
            .bind(promo_code_id)
            .fetch_one(executor)
            .await?;
        Ok(exists)
    }

    pub async fn increment_uses<'e, E>(&self, executor: E, promo_code_id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE promo_codes SET current_uses = current_uses + 1 WHERE id = $1")
            .bind(promo_code_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn insert_usage<'e, E>(
        &self,
        executor: E,
        user_id: i32,
        promo_code_id: i32,
        order_id: Option<i32>,
    ) -> Result<UserPromoCodeUsage, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, UserPromoCodeUsage>(
            r#"
            INSERT INTO user_promo_code_usages (user_id, promo_code_id, order_id)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, promo_code_id, order_id, used_at
            "#,
        )
            .bind(user_id)
            .bind(promo_code_id)
            .bind(order_id)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                // O índice único é a última barreira contra resgates concorrentes.
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::PromoCodeAlreadyUsed { user_id, promo_code_id };
                    }
                }
                e.into()
            })
    }
}
