// src/services/scan_poller.rs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;

use crate::{
    common::error::{AppError, ErrorKind},
    db::Store,
    models::scans::{MeshTaskStatus, ScanStatus, ScanTransaction},
    services::{notification::ConfirmationNotifier, subscription_service::SubscriptionService},
};

/// API de processamento de malhas (segmentação de CBCT).
#[async_trait]
pub trait MeshApi: Send + Sync {
    async fn task_status(&self, guid: Uuid) -> Result<MeshTaskStatus, AppError>;
}

#[derive(Clone)]
pub struct MeshApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl MeshApiClient {
    pub fn new(base_url: String, token: String, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::MeshApiError(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }
}

#[async_trait]
impl MeshApi for MeshApiClient {
    async fn task_status(&self, guid: Uuid) -> Result<MeshTaskStatus, AppError> {
        let url = format!("{}/static_token/cbct_task/{}", self.base_url, guid);

        let response = self
            .http
            .get(&url)
            .header("accept", "application/json")
            .header("token", &self.token)
            .send()
            .await
            .map_err(|e| AppError::MeshApiError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::MeshApiError(format!(
                "status {} para a tarefa {}",
                response.status(),
                guid
            )));
        }

        response
            .json::<MeshTaskStatus>()
            .await
            .map_err(|e| AppError::MeshApiError(format!("resposta inválida para {guid}: {e}")))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub checked: usize,
    pub completed: usize,
    pub failed: usize,
    pub errors: usize,
}

/// Tarefa de fundo que acompanha os scans em andamento.
pub struct ScanPoller {
    store: Arc<dyn Store>,
    mesh: Arc<dyn MeshApi>,
    notifier: ConfirmationNotifier,
    interval: Duration,
}

impl ScanPoller {
    pub fn new(
        store: Arc<dyn Store>,
        mesh: Arc<dyn MeshApi>,
        notifier: ConfirmationNotifier,
        interval: Duration,
    ) -> Self {
        Self { store, mesh, notifier, interval }
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        tracing::info!("🔁 Monitor de scans iniciado (a cada {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.poll_once().await {
                        Ok(summary) if summary.checked > 0 => {
                            tracing::info!(
                                "🔁 Scans verificados: {} (concluídos {}, falhos {}, erros {})",
                                summary.checked, summary.completed, summary.failed, summary.errors
                            );
                        }
                        Ok(_) => {}
                        Err(e) => tracing::error!("🔥 Falha ao listar scans em andamento: {:?}", e),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("🛑 Monitor de scans encerrado");
                        break;
                    }
                }
            }
        }
    }

    /// Uma rodada. Erros de um scan ficam no log e não param os demais.
    pub async fn poll_once(&self) -> Result<PollSummary, AppError> {
        let mut uow = self.store.begin().await?;
        let open = uow.list_open_scans().await?;
        uow.rollback().await?;

        let mut summary = PollSummary::default();
        for scan in open {
            summary.checked += 1;
            match self.check_scan(&scan).await {
                Ok(Some(ScanStatus::Completed)) => summary.completed += 1,
                Ok(Some(_)) => summary.failed += 1,
                Ok(None) => {}
                Err(e) => {
                    summary.errors += 1;
                    tracing::error!("🔥 Erro ao verificar o scan {}: {:?}", scan.transaction_guid, e);
                }
            }
        }
        Ok(summary)
    }

    async fn check_scan(&self, scan: &ScanTransaction) -> Result<Option<ScanStatus>, AppError> {
        let remote = self.mesh.task_status(scan.transaction_guid).await?;
        let Some(outcome) = remote.outcome() else {
            tracing::debug!("Scan {} ainda '{}'", scan.transaction_guid, remote.status);
            return Ok(None);
        };

        let mut uow = self.store.begin().await?;
        uow.update_scan_result(
            scan.id,
            outcome,
            remote.signed_download_url.clone(),
            remote.short_viewer_url.clone(),
        )
        .await?;

        if outcome == ScanStatus::Completed {
            if let Err(e) = SubscriptionService::record_segmentation_in(uow.as_mut(), scan.user_id).await {
                if e.kind() != ErrorKind::BusinessRejection {
                    return Err(e);
                }
                tracing::warn!("⚠️ Scan {} concluído sem débito de segmentação: {}", scan.transaction_guid, e);
            }
        }

        let user = uow.get_user(scan.user_id).await?;
        uow.commit().await?;
        tracing::info!("✅ Scan {} finalizado como {:?}", scan.transaction_guid, outcome);

        let updated = ScanTransaction {
            status: outcome,
            result_folder: remote.signed_download_url.or_else(|| scan.result_folder.clone()),
            result_view_url: remote.short_viewer_url.or_else(|| scan.result_view_url.clone()),
            ..scan.clone()
        };
        match user {
            Some(user) => match self.notifier.render_scan_result(&updated, &user.email) {
                Ok(email) => {
                    self.notifier.dispatch(email).await;
                }
                Err(e) => tracing::warn!("⚠️ E-mail do scan {} não foi montado: {}", scan.transaction_guid, e),
            },
            None => tracing::warn!("⚠️ Usuário {} do scan {} não encontrado", scan.user_id, scan.transaction_guid),
        }

        Ok(Some(outcome))
    }
}
