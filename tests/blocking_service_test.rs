//! The blocking service API over in-memory ports
//!
//! These are plain `#[test]` functions: the service drives its own runtime.

mod common;

use batch_exports::core::destinations::DestinationRegistry;
use batch_exports::core::service::BatchExportService;
use batch_exports::domain::{BatchExportError, BatchExportId, EngineError, RunStatus};
use chrono::{TimeZone, Utc};
use common::{s3_batch_export, EngineCall, InMemoryStore, RecordingEngine, TASK_QUEUE};
use std::sync::Arc;

fn service() -> (BatchExportService, Arc<InMemoryStore>, Arc<RecordingEngine>) {
    let store = InMemoryStore::new();
    let engine = RecordingEngine::new();
    let service = BatchExportService::new(
        store.clone(),
        store.clone(),
        engine.clone(),
        DestinationRegistry::with_defaults(),
        TASK_QUEUE,
    )
    .unwrap();
    (service, store, engine)
}

#[test]
fn test_create_pause_describe() {
    let (service, _store, _engine) = service();
    let export = s3_batch_export();

    service.save_batch_export(&export).unwrap();
    service.create_batch_export(&export).unwrap();
    assert!(!service.describe_schedule(&export.id).unwrap().paused);

    service
        .pause_batch_export(&export.id, Some("Paused by test"))
        .unwrap();
    let description = service.describe_schedule(&export.id).unwrap();
    assert!(description.paused);
    assert_eq!(description.note.as_deref(), Some("Paused by test"));
    assert!(service.get_batch_export(&export.id).unwrap().paused);

    service.unpause_batch_export(&export.id, None).unwrap();
    assert!(!service.describe_schedule(&export.id).unwrap().paused);
    assert!(!service.get_batch_export(&export.id).unwrap().paused);
}

#[test]
fn test_pause_with_engine_down_reports_partial_sync() {
    let (service, _store, engine) = service();
    let export = s3_batch_export();
    service.save_batch_export(&export).unwrap();
    service.create_batch_export(&export).unwrap();

    engine.fail_next(EngineError::Timeout("30s".to_string()));
    let err = service.pause_batch_export(&export.id, None).unwrap_err();

    assert!(matches!(err, BatchExportError::PartialSyncFailure { .. }));
    assert!(service.get_batch_export(&export.id).unwrap().paused);
}

#[test]
fn test_run_lifecycle_through_service() {
    let (service, _store, _engine) = service();
    let export = s3_batch_export();
    service.save_batch_export(&export).unwrap();

    let start = Utc.with_ymd_and_hms(2023, 4, 25, 13, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2023, 4, 25, 14, 0, 0).unwrap();
    let run = service
        .create_batch_export_run(2, "wf", "run", export.id, Some(start), Some(end))
        .unwrap();
    let again = service
        .create_batch_export_run(2, "wf", "run", export.id, Some(start), Some(end))
        .unwrap();
    assert_eq!(run.id, again.id);

    service
        .update_batch_export_run_status(&run.id, RunStatus::Completed)
        .unwrap();
    service
        .update_batch_export_run_status(&run.id, RunStatus::Failed)
        .unwrap();

    let runs = service.list_runs(&export.id, 10).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RunStatus::Completed);
    assert_eq!(service.get_run(&run.id).unwrap().status, RunStatus::Completed);
}

#[test]
fn test_backfill_through_service() {
    let (service, store, engine) = service();
    let export = s3_batch_export();
    service.save_batch_export(&export).unwrap();

    let start = Utc.with_ymd_and_hms(2023, 4, 1, 0, 0, 0).unwrap();
    let run = service
        .backfill_export(&export.id, Some(start), None)
        .unwrap();

    assert_eq!(store.run_count(), 1);
    assert_eq!(engine.executions()[0].workflow_id, run.id.to_string());
}

#[test]
fn test_delete_removes_schedule_then_definition() {
    let (service, store, engine) = service();
    let export = s3_batch_export();
    service.save_batch_export(&export).unwrap();
    service.create_batch_export(&export).unwrap();
    service.backfill_export(&export.id, None, None).unwrap();

    service.delete_batch_export(&export.id).unwrap();

    assert!(engine
        .calls()
        .contains(&EngineCall::Delete(export.id.to_string())));
    assert!(store.export(&export.id).is_none());
    assert_eq!(store.run_count(), 0);
    assert!(matches!(
        service.get_batch_export(&export.id),
        Err(BatchExportError::BatchExportNotFound(_))
    ));
}

#[test]
fn test_delete_keeps_definition_when_schedule_missing() {
    let (service, store, _engine) = service();
    let export = s3_batch_export();
    service.save_batch_export(&export).unwrap();

    let err = service.delete_batch_export(&export.id).unwrap_err();

    assert!(matches!(err, BatchExportError::ScheduleNotFound(_)));
    assert!(store.export(&export.id).is_some());
}

#[test]
fn test_execute_workflow_with_cli_inputs() {
    let (service, _store, engine) = service();
    let args: Vec<String> = [
        "bucket_name=exports",
        "region=eu-west-1",
        "key_template=manual/{day}",
        "batch_window_size=300",
        "team_id=9",
        "batch_export_id=manual",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let handle = service.execute_workflow("s3-export", &args).unwrap();

    let executions = engine.executions();
    assert_eq!(executions.len(), 1);
    assert_eq!(executions[0].workflow_id, handle.workflow_id);
    assert_eq!(executions[0].workflow_type, "s3-export");
    assert_eq!(executions[0].input["team_id"], 9);
    assert_eq!(executions[0].input["table_name"], "events");
    assert!(executions[0].search_attributes.is_empty());
}

#[test]
fn test_execute_unknown_workflow() {
    let (service, _store, engine) = service();

    let err = service.execute_workflow("gcs-export", &[]).unwrap_err();

    assert!(matches!(err, BatchExportError::Validation(_)));
    assert!(engine.calls().is_empty());
}

#[test]
fn test_get_unknown_export() {
    let (service, _store, _engine) = service();
    assert!(matches!(
        service.get_batch_export(&BatchExportId::new()),
        Err(BatchExportError::BatchExportNotFound(_))
    ));
}

#[test]
fn test_register_twice_keeps_live_export() {
    let (service, store, engine) = service();
    let export = s3_batch_export();
    service.register_batch_export(&export).unwrap();
    let run = service
        .create_batch_export_run(
            export.team.id,
            &export.id.to_string(),
            "run-1",
            export.id,
            None,
            None,
        )
        .unwrap();

    let mut renamed = export.clone();
    renamed.name = "Renamed".to_string();
    let err = service.register_batch_export(&renamed).unwrap_err();

    assert!(matches!(err, BatchExportError::Validation(_)));
    assert_eq!(store.export(&export.id).unwrap().name, export.name);
    assert_eq!(service.get_run(&run.id).unwrap().id, run.id);
    assert_eq!(engine.schedule_paused(&export.id.to_string()), Some(false));
    assert_eq!(engine.calls().len(), 1);
}

#[test]
fn test_register_removes_definition_when_engine_fails() {
    let (service, store, engine) = service();
    let export = s3_batch_export();

    engine.fail_next(EngineError::ConnectionFailed("refused".to_string()));
    let err = service.register_batch_export(&export).unwrap_err();

    assert!(matches!(
        err,
        BatchExportError::Engine(EngineError::ConnectionFailed(_))
    ));
    assert!(store.export(&export.id).is_none());
}

#[test]
fn test_register_keeps_definition_when_schedule_exists() {
    let (service, store, engine) = service();
    let export = s3_batch_export();
    service.create_batch_export(&export).unwrap();

    let err = service.register_batch_export(&export).unwrap_err();

    assert!(matches!(err, BatchExportError::ScheduleAlreadyExists(_)));
    assert!(store.export(&export.id).is_some());
    assert_eq!(engine.schedule_paused(&export.id.to_string()), Some(false));
}
