// src/db/scan_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::scans::{NewScanTransaction, ScanStatus, ScanTransaction},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanRepository;

impl ScanRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert<'e, E>(&self, executor: E, new: NewScanTransaction) -> Result<ScanTransaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let scan = sqlx::query_as::<_, ScanTransaction>(
            r#"
            INSERT INTO scan_transactions (transaction_guid, s3_url, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, transaction_guid, s3_url, user_id, status, result_folder, result_view_url, created_at
            "#,
        )
            .bind(new.transaction_guid)
            .bind(&new.s3_url)
            .bind(new.user_id)
            .fetch_one(executor)
            .await?;
        Ok(scan)
    }

    pub async fn find_by_guid<'e, E>(&self, executor: E, guid: Uuid) -> Result<Option<ScanTransaction>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let scan = sqlx::query_as::<_, ScanTransaction>(
            r#"
            SELECT id, transaction_guid, s3_url, user_id, status, result_folder, result_view_url, created_at
            FROM scan_transactions
            WHERE transaction_guid = $1
            "#,
        )
            .bind(guid)
            .fetch_optional(executor)
            .await?;
        Ok(scan)
    }

    pub async fn list_open<'e, E>(&self, executor: E) -> Result<Vec<ScanTransaction>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let scans = sqlx::query_as::<_, ScanTransaction>(
            r#"
            SELECT id, transaction_guid, s3_url, user_id, status, result_folder, result_view_url, created_at
            FROM scan_transactions
            WHERE status IN ('pending', 'running')
            ORDER BY created_at ASC
            "#,
        )
            .fetch_all(executor)
            .await?;
        Ok(scans)
    }

    pub async fn update_result<'e, E>(
        &self,
        executor: E,
        id: i32,
        status: ScanStatus,
        result_folder: Option<String>,
        result_view_url: Option<String>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE scan_transactions
            SET status = $2,
                result_folder = COALESCE($3, result_folder),
                result_view_url = COALESCE($4, result_view_url)
            WHERE id = $1
            "#,
        )
            .bind(id)
            .bind(status)
            .bind(result_folder)
            .bind(result_view_url)
            .execute(executor)
            .await?;
        Ok(())
    }
}
