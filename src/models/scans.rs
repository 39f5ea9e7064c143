// src/models/scans.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "scan_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn is_open(self) -> bool {
        matches!(self, ScanStatus::Pending | ScanStatus::Running)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanTransaction {
    pub id: i32,
    pub transaction_guid: Uuid,
    pub s3_url: String,
    pub user_id: i32,
    pub status: ScanStatus,
    pub result_folder: Option<String>,
    pub result_view_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewScanTransaction {
    pub transaction_guid: Uuid,
    pub s3_url: String,
    pub user_id: i32,
}

/// Resposta da API de processamento para uma tarefa.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MeshTaskStatus {
    pub status: String,
    pub signed_download_url: Option<String>,
    pub short_viewer_url: Option<String>,
}

impl MeshTaskStatus {
    /// Traduz o status remoto; `None` quando a tarefa ainda está em andamento.
    pub fn outcome(&self) -> Option<ScanStatus> {
        match self.status.trim().to_ascii_lowercase().as_str() {
            "success" | "completed" | "done" => Some(ScanStatus::Completed),
            "error" | "failed" | "failure" => Some(ScanStatus::Failed),
            _ => None,
        }
    }
}
