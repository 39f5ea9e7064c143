// src/services/scan_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::Store,
    models::scans::{NewScanTransaction, ScanTransaction},
};

/// Registro dos scans enviados para processamento. O acompanhamento fica com o `ScanPoller`.
#[derive(Clone)]
pub struct ScanService {
    store: Arc<dyn Store>,
}

impl ScanService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn track(&self, user_id: i32, transaction_guid: Uuid, s3_url: String) -> Result<ScanTransaction, AppError> {
        let mut uow = self.store.begin().await?;
        uow.get_user(user_id).await?.ok_or(AppError::UserNotFound(user_id))?;

        let scan = uow
            .insert_scan(NewScanTransaction { transaction_guid, s3_url, user_id })
            .await?;
        uow.commit().await?;

        tracing::info!("🦷 Scan {} em processamento para o usuário {}", scan.transaction_guid, user_id);
        Ok(scan)
    }

    pub async fn get_scan(&self, guid: Uuid) -> Result<ScanTransaction, AppError> {
        let mut uow = self.store.begin().await?;
        let scan = uow.find_scan(guid).await?.ok_or(AppError::ScanNotFound(guid))?;
        uow.rollback().await?;
        Ok(scan)
    }
}
