// src/db/outbox_repo.rs

use sqlx::{Executor, Postgres};

use crate::common::error::AppError;

// Fila de e-mails lida por um relay SMTP externo.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutboxRepository;

impl OutboxRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn enqueue<'e, E>(
        &self,
        executor: E,
        to: &str,
        cc: Option<&str>,
        subject: &str,
        html_body: &str,
    ) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO email_outbox (to_address, cc_address, subject, html_body)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
            .bind(to)
            .bind(cc)
            .bind(subject)
            .bind(html_body)
            .fetch_one(executor)
            .await?;
        Ok(id)
    }
}
