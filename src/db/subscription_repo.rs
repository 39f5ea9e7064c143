// src/db/subscription_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::subscriptions::{NewSubscriptionPlan, NewUserSubscription, SubscriptionPlan, UserSubscription},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct SubscriptionRepository;

impl SubscriptionRepository {
    pub fn new() -> Self {
        Self
    }

    // --- Planos ---

    pub async fn list_plans<'e, E>(&self, executor: E) -> Result<Vec<SubscriptionPlan>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let plans = sqlx::query_as::<_, SubscriptionPlan>(
            r#"
            SELECT id, name, price, segmentations_allowed, description, is_active
            FROM subscription_plans
            WHERE is_active
            ORDER BY price ASC
            "#,
        )
            .fetch_all(executor)
            .await?;
        Ok(plans)
    }

    pub async fn find_plan<'e, E>(&self, executor: E, id: i32) -> Result<Option<SubscriptionPlan>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let plan = sqlx::query_as::<_, SubscriptionPlan>(
            "SELECT id, name, price, segmentations_allowed, description, is_active FROM subscription_plans WHERE id = $1",
        )
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(plan)
    }

    pub async fn insert_plan<'e, E>(&self, executor: E, new: NewSubscriptionPlan) -> Result<SubscriptionPlan, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let plan = sqlx::query_as::<_, SubscriptionPlan>(
            r#"
            INSERT INTO subscription_plans (name, price, segmentations_allowed, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, price, segmentations_allowed, description, is_active
            "#,
        )
            .bind(&new.name)
            .bind(new.price)
            .bind(new.segmentations_allowed)
            .bind(&new.description)
            .fetch_one(executor)
            .await?;
        Ok(plan)
    }

    // --- Assinaturas dos usuários ---

    pub async fn insert_subscription<'e, E>(
        &self,
        executor: E,
        new: NewUserSubscription,
    ) -> Result<UserSubscription, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let subscription = sqlx::query_as::<_, UserSubscription>(
            r#"
            INSERT INTO user_subscriptions (user_id, plan_id, order_id, segmentations_allowed, expires_at, is_active)
            VALUES ($1, $2, $3, $4, $5, FALSE)
            RETURNING id, user_id, plan_id, order_id, segmentations_used, segmentations_allowed,
                      subscribed_at, expires_at, is_active
            "#,
        )
            .bind(new.user_id)
            .bind(new.plan_id)
            .bind(new.order_id)
            .bind(new.segmentations_allowed)
            .bind(new.expires_at)
            .fetch_one(executor)
            .await?;
        Ok(subscription)
    }

    pub async fn find_by_order<'e, E>(
        &self,
        executor: E,
        user_id: i32,
        order_id: i32,
    ) -> Result<Option<UserSubscription>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let subscription = sqlx::query_as::<_, UserSubscription>(
            r#"
            SELECT id, user_id, plan_id, order_id, segmentations_used, segmentations_allowed,
                   subscribed_at, expires_at, is_active
            FROM user_subscriptions
            WHERE user_id = $1 AND order_id = $2
            ORDER BY id DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
            .bind(user_id)
            .bind(order_id)
            .fetch_optional(executor)
            .await?;
        Ok(subscription)
    }

    pub async fn find_active<'e, E>(&self, executor: E, user_id: i32) -> Result<Option<UserSubscription>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let subscription = sqlx::query_as::<_, UserSubscription>(
            r#"
            SELECT id, user_id, plan_id, order_id, segmentations_used, segmentations_allowed,
                   subscribed_at, expires_at, is_active
            FROM user_subscriptions
            WHERE user_id = $1 AND is_active
            FOR UPDATE
            "#,
        )
            .bind(user_id)
            .fetch_optional(executor)
            .await?;
        Ok(subscription)
    }

    pub async fn list_for_user<'e, E>(&self, executor: E, user_id: i32) -> Result<Vec<UserSubscription>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let subscriptions = sqlx::query_as::<_, UserSubscription>(
            r#"
            SELECT id, user_id, plan_id, order_id, segmentations_used, segmentations_allowed,
                   subscribed_at, expires_at, is_active
            FROM user_subscriptions
            WHERE user_id = $1
            ORDER BY subscribed_at DESC, id DESC
            "#,
        )
            .bind(user_id)
            .fetch_all(executor)
            .await?;
        Ok(subscriptions)
    }

    pub async fn deactivate_all<'e, E>(&self, executor: E, user_id: i32) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE user_subscriptions SET is_active = FALSE WHERE user_id = $1 AND is_active")
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn set_active<'e, E>(&self, executor: E, id: i32, active: bool) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE user_subscriptions SET is_active = $2 WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn increment_used<'e, E>(&self, executor: E, id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE user_subscriptions SET segmentations_used = segmentations_used + 1 WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
