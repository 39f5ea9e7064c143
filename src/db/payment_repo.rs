// src/db/payment_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::payments::{NewPayment, Payment},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentRepository;

impl PaymentRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert_payment<'e, E>(&self, executor: E, new: NewPayment) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (order_id, method, status, amount, transaction_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, order_id, method, status, amount, transaction_id, notes, created_at
            "#,
        )
            .bind(new.order_id)
            .bind(&new.method)
            .bind(&new.status)
            .bind(new.amount)
            .bind(&new.transaction_id)
            .bind(&new.notes)
            .fetch_one(executor)
            .await?;
        Ok(payment)
    }

    pub async fn find_by_transaction<'e, E>(&self, executor: E, transaction_id: &str) -> Result<Option<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, order_id, method, status, amount, transaction_id, notes, created_at
            FROM payments
            WHERE transaction_id = $1
            FOR UPDATE
            "#,
        )
            .bind(transaction_id)
            .fetch_optional(executor)
            .await?;
        Ok(payment)
    }

    pub async fn update_status<'e, E>(&self, executor: E, id: i32, status: &str) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE payments SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(executor)
            .await?;
        Ok(())
    }
}
