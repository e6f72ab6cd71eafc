use valve_inspection_lib::presentation::dto::inspection_dto::{
    ListInspectionsRequest, SubmitInspectionRequest,
};
use valve_inspection_lib::{AppConfig, AppError, AppState};

const PHOTO: &str = "data:image/jpeg;base64,/9j/4AAQ";

fn config_in(dir: &std::path::Path) -> AppConfig {
    let data_dir = dir.to_string_lossy().into_owned();
    let mut config = AppConfig::default();
    config.database.url = format!("sqlite:{data_dir}/inspections.db?mode=rwc");
    config.storage.blob_dir = format!("{data_dir}/blobs");
    config.storage.data_dir = data_dir;
    config.storage.public_base_url = "https://cdn.test/photos".to_string();
    config.sync.auto_sync = false;
    config.sync.cooldown_ms = 0;
    config
}

fn request(valve_code: &str) -> SubmitInspectionRequest {
    SubmitInspectionRequest {
        valve_code: valve_code.to_string(),
        photo_initial: Some(PHOTO.to_string()),
        photo_during: Some(PHOTO.to_string()),
        photo_final: Some(PHOTO.to_string()),
        editing_id: None,
    }
}

#[tokio::test]
async fn handler_submits_online_and_lists_history() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(config_in(dir.path())).await.unwrap();
    state.start().await.unwrap();
    let handler = &state.sync_handler;

    let response = handler.submit(request("VLV-1")).await;
    assert!(response.success, "{:?}", response.error);
    let data = response.data.unwrap();
    assert_eq!(data.outcome, "saved");
    assert_eq!(data.record.unwrap().status, "concluido");

    let page = handler
        .list_inspections(ListInspectionsRequest {
            search: Some("vlv".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].valve_code.as_deref(), Some("VLV-1"));

    state.shutdown().await;
}

#[tokio::test]
async fn invalid_request_is_rejected_with_validation_code() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(config_in(dir.path())).await.unwrap();

    let mut no_photos = request("VLV-2");
    no_photos.photo_initial = None;
    no_photos.photo_during = None;
    no_photos.photo_final = None;

    let response = state.sync_handler.submit(no_photos.clone()).await;
    assert!(!response.success);
    assert_eq!(response.error_code.as_deref(), Some("VALIDATION_ERROR"));
    assert!(!state.sync_handler.save_pending_inspection(no_photos));
    assert_eq!(state.sync_handler.pending_count(), 0);
}

#[tokio::test]
async fn queue_survives_restart_and_syncs_when_back_online() {
    let dir = tempfile::tempdir().unwrap();
    {
        let state = AppState::new(config_in(dir.path())).await.unwrap();
        state.sync_handler.set_online(false);

        let response = state.sync_handler.submit(request("VLV-3")).await;
        assert_eq!(response.data.unwrap().outcome, "queued");
        assert!(state.sync_handler.save_pending_inspection(request("VLV-4")));

        let err = state.sync_handler.sync_pending_data().await.unwrap_err();
        assert!(matches!(err, AppError::Offline(_)));
        state.shutdown().await;
    }

    let state = AppState::new(config_in(dir.path())).await.unwrap();
    assert_eq!(state.sync_handler.pending_count(), 2);

    let result = state.sync_handler.sync_pending_data().await.unwrap();
    assert_eq!(result.outcome, "completed");
    assert_eq!(result.synced_count, 2);
    assert_eq!(result.message.as_deref(), Some("2 synced"));

    let status = state.sync_handler.status();
    assert!(status.is_online);
    assert!(!status.is_syncing);
    assert_eq!(status.pending_count, 0);
    assert_eq!(status.metrics.entries.successes, 2);
    state.shutdown().await;
}

#[tokio::test]
async fn editing_offline_returns_offline_code() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(config_in(dir.path())).await.unwrap();
    state.sync_handler.set_online(false);

    let mut edit = request("VLV-5");
    edit.editing_id = Some("3f0e6f8e-6c57-4c0c-9d2e-0d5e0f3c2a11".into());
    let response = state.sync_handler.submit(edit).await;

    assert!(!response.success);
    assert_eq!(response.error_code.as_deref(), Some("OFFLINE"));
    assert_eq!(state.sync_handler.pending_count(), 0);
}

#[tokio::test]
async fn dropped_sync_request_reports_queued_entries() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.sync.cooldown_ms = 60_000;
    let state = AppState::new(config).await.unwrap();
    let handler = &state.sync_handler;

    let first = handler.sync_pending_data().await.unwrap();
    assert_eq!(first.outcome, "nothing_to_sync");
    assert_eq!(first.pending_count, 0);

    assert!(handler.save_pending_inspection(request("VLV-6")));
    let second = handler.sync_pending_data().await.unwrap();
    assert_eq!(second.outcome, "cooling_down");
    assert_eq!(second.pending_count, 1);
    assert_eq!(handler.pending_count(), 1);

    state.shutdown().await;
}
