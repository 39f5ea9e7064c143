mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use common::*;
use tiara_backend::{
    common::error::AppError,
    db::Store,
    models::scans::{MeshTaskStatus, ScanStatus},
    services::{MeshApi, ScanPoller, ScanService},
};
use tokio::sync::watch;
use uuid::Uuid;

/// API de malhas com respostas fixas por GUID.
#[derive(Default)]
struct FakeMesh {
    replies: Mutex<HashMap<Uuid, Result<MeshTaskStatus, String>>>,
}

impl FakeMesh {
    fn reply(&self, guid: Uuid, status: &str, download: Option<&str>, viewer: Option<&str>) {
        self.replies.lock().unwrap().insert(
            guid,
            Ok(MeshTaskStatus {
                status: status.into(),
                signed_download_url: download.map(Into::into),
                short_viewer_url: viewer.map(Into::into),
            }),
        );
    }

    fn fail(&self, guid: Uuid, message: &str) {
        self.replies.lock().unwrap().insert(guid, Err(message.into()));
    }
}

#[async_trait]
impl MeshApi for FakeMesh {
    async fn task_status(&self, guid: Uuid) -> Result<MeshTaskStatus, AppError> {
        match self.replies.lock().unwrap().get(&guid) {
            Some(Ok(status)) => Ok(status.clone()),
            Some(Err(message)) => Err(AppError::MeshApiError(message.clone())),
            None => Err(AppError::MeshApiError(format!("tarefa {guid} desconhecida"))),
        }
    }
}

fn guid(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

struct ScanHarness {
    h: Harness,
    scans: ScanService,
    mesh: Arc<FakeMesh>,
    poller: ScanPoller,
}

fn scan_harness() -> ScanHarness {
    let h = harness();
    let store: Arc<dyn Store> = Arc::new(h.store.clone());
    let mesh = Arc::new(FakeMesh::default());
    let poller = ScanPoller::new(store.clone(), mesh.clone(), h.notifier.clone(), Duration::from_millis(10));
    ScanHarness {
        scans: ScanService::new(store),
        h,
        mesh,
        poller,
    }
}

#[tokio::test]
async fn tracked_scan_starts_running() {
    let s = scan_harness();
    s.h.store.put_user(user(4)).await;

    let scan = s.scans.track(4, guid(1), "s3://scans/1.zip".into()).await.unwrap();

    assert_eq!(scan.status, ScanStatus::Running);
    assert_eq!(s.scans.get_scan(guid(1)).await.unwrap().id, scan.id);
}

#[tokio::test]
async fn tracking_requires_a_known_user() {
    let s = scan_harness();

    assert!(matches!(
        s.scans.track(9, guid(1), "s3://scans/1.zip".into()).await,
        Err(AppError::UserNotFound(9))
    ));
    assert!(matches!(s.scans.get_scan(guid(1)).await, Err(AppError::ScanNotFound(_))));
}

#[tokio::test]
async fn completed_scan_debits_a_segmentation_and_mails_the_user() {
    let s = scan_harness();
    s.h.store.put_user(user(4)).await;
    s.h.store.put_subscription(subscription(40, 4, 1, 90, true)).await;
    s.scans.track(4, guid(1), "s3://scans/1.zip".into()).await.unwrap();
    s.mesh.reply(guid(1), "success", Some("https://files/1"), Some("https://view/1"));

    let summary = s.poller.poll_once().await.unwrap();

    assert_eq!(summary.checked, 1);
    assert_eq!(summary.completed, 1);
    let scan = s.h.store.scan(guid(1)).await.unwrap();
    assert_eq!(scan.status, ScanStatus::Completed);
    assert_eq!(scan.result_folder.as_deref(), Some("https://files/1"));
    assert_eq!(scan.result_view_url.as_deref(), Some("https://view/1"));
    assert_eq!(s.h.store.user_subscriptions(4).await[0].segmentations_used, 1);

    let sent = s.h.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "dentista4@example.com");
    assert!(sent[0].html_body.contains("https://view/1"));

    // Scan finalizado sai da lista.
    assert_eq!(s.poller.poll_once().await.unwrap().checked, 0);
}

#[tokio::test]
async fn completed_scan_without_quota_is_still_finished() {
    let s = scan_harness();
    s.h.store.put_user(user(4)).await;
    s.scans.track(4, guid(2), "s3://scans/2.zip".into()).await.unwrap();
    s.mesh.reply(guid(2), "completed", None, None);

    let summary = s.poller.poll_once().await.unwrap();

    assert_eq!(summary.completed, 1);
    assert_eq!(summary.errors, 0);
    assert_eq!(s.h.store.scan(guid(2)).await.unwrap().status, ScanStatus::Completed);
}

#[tokio::test]
async fn failed_scan_is_reported_without_debit() {
    let s = scan_harness();
    s.h.store.put_user(user(4)).await;
    s.h.store.put_subscription(subscription(40, 4, 1, 90, true)).await;
    s.scans.track(4, guid(3), "s3://scans/3.zip".into()).await.unwrap();
    s.mesh.reply(guid(3), "error", None, None);

    let summary = s.poller.poll_once().await.unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(s.h.store.scan(guid(3)).await.unwrap().status, ScanStatus::Failed);
    assert_eq!(s.h.store.user_subscriptions(4).await[0].segmentations_used, 0);
    assert!(s.h.mailer.sent()[0].html_body.contains("failed"));
}

#[tokio::test]
async fn scans_in_progress_and_api_errors_stay_open() {
    let s = scan_harness();
    s.h.store.put_user(user(4)).await;
    s.scans.track(4, guid(4), "s3://scans/4.zip".into()).await.unwrap();
    s.scans.track(4, guid(5), "s3://scans/5.zip".into()).await.unwrap();
    s.mesh.reply(guid(4), "processing", None, None);
    s.mesh.fail(guid(5), "502 Bad Gateway");

    let summary = s.poller.poll_once().await.unwrap();

    assert_eq!(summary.checked, 2);
    assert_eq!(summary.completed + summary.failed, 0);
    assert_eq!(summary.errors, 1);
    assert_eq!(s.h.store.scan(guid(4)).await.unwrap().status, ScanStatus::Running);
    assert_eq!(s.h.store.scan(guid(5)).await.unwrap().status, ScanStatus::Running);
    assert!(s.h.mailer.sent().is_empty());
}

#[tokio::test]
async fn poller_stops_on_shutdown() {
    let s = scan_harness();
    let (tx, rx) = watch::channel(false);

    let handle = tokio::spawn(s.poller.run(rx));
    tx.send(true).unwrap();

    tokio::time::timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
}

