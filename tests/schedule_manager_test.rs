//! Schedule creation and the pause/unpause saga

mod common;

use batch_exports::core::destinations::DestinationRegistry;
use batch_exports::core::schedules::ScheduleManager;
use batch_exports::domain::{BatchExportError, BatchExportId, EngineError};
use common::{s3_batch_export, EngineCall, InMemoryStore, RecordingEngine, TASK_QUEUE};
use serde_json::json;
use std::sync::Arc;

fn manager(store: &Arc<InMemoryStore>, engine: &Arc<RecordingEngine>) -> ScheduleManager {
    ScheduleManager::new(
        store.clone(),
        engine.clone(),
        Arc::new(DestinationRegistry::with_defaults()),
        TASK_QUEUE,
    )
}

#[tokio::test]
async fn test_create_registers_schedule_for_export() {
    let export = s3_batch_export();
    let store = InMemoryStore::with_export(&export);
    let engine = RecordingEngine::new();

    manager(&store, &engine).create(&export).await.unwrap();

    let calls = engine.calls();
    assert_eq!(calls.len(), 1);
    let EngineCall::Create(request) = &calls[0] else {
        panic!("expected a create call, got {calls:?}");
    };

    assert_eq!(request.schedule_id, export.id.to_string());
    assert_eq!(request.action.workflow_id, export.id.to_string());
    assert_eq!(request.action.workflow_type, "s3-export");
    assert_eq!(request.action.task_queue, TASK_QUEUE);
    assert_eq!(request.spec.intervals, vec![3600]);
    assert!(!request.state.paused);
    assert_eq!(
        request.state.note.as_deref(),
        Some(
            format!(
                "Schedule created for BatchExport {} to Destination {} in Team 2.",
                export.id, export.destination.id
            )
            .as_str()
        )
    );

    assert_eq!(request.action.input["bucket_name"], "exports-bucket");
    assert_eq!(request.action.input["batch_window_size"], 3600);
    assert_eq!(request.action.input["team_id"], 2);
    assert_eq!(
        request.action.input["batch_export_id"],
        json!(export.id.to_string())
    );

    for key in [
        "DestinationId",
        "DestinationType",
        "TeamId",
        "TeamName",
        "BatchExportId",
    ] {
        assert!(request.search_attributes.contains_key(key), "missing {key}");
    }
    assert_eq!(request.search_attributes, request.action.search_attributes);
    assert_eq!(request.search_attributes["TeamName"], vec![json!("Analytics")]);
}

#[tokio::test]
async fn test_describe_reflects_paused_state_at_creation() {
    for paused in [true, false] {
        let mut export = s3_batch_export();
        export.paused = paused;
        let store = InMemoryStore::with_export(&export);
        let engine = RecordingEngine::new();
        let manager = manager(&store, &engine);

        manager.create(&export).await.unwrap();
        let description = manager.describe(&export.id).await.unwrap();

        assert_eq!(description.paused, paused);
        assert_eq!(description.schedule_id, export.id.to_string());
    }
}

#[tokio::test]
async fn test_create_twice_is_a_conflict() {
    let export = s3_batch_export();
    let store = InMemoryStore::with_export(&export);
    let engine = RecordingEngine::new();
    let manager = manager(&store, &engine);

    manager.create(&export).await.unwrap();
    let err = manager.create(&export).await.unwrap_err();

    assert!(matches!(err, BatchExportError::ScheduleAlreadyExists(_)));
}

#[tokio::test]
async fn test_create_with_unknown_destination_makes_no_engine_call() {
    let mut export = s3_batch_export();
    export.destination.destination_type = "Snowflake".to_string();
    let store = InMemoryStore::with_export(&export);
    let engine = RecordingEngine::new();

    let err = manager(&store, &engine).create(&export).await.unwrap_err();

    assert!(matches!(err, BatchExportError::UnknownDestinationType(t) if t == "Snowflake"));
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn test_create_with_invalid_config_makes_no_engine_call() {
    let mut export = s3_batch_export();
    export.destination.config.remove("bucket_name");
    let store = InMemoryStore::with_export(&export);
    let engine = RecordingEngine::new();

    let err = manager(&store, &engine).create(&export).await.unwrap_err();

    assert!(matches!(
        err,
        BatchExportError::InvalidWorkflowInputs { ref workflow, .. } if workflow == "s3-export"
    ));
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn test_pause_updates_flag_and_schedule() {
    let export = s3_batch_export();
    let store = InMemoryStore::with_export(&export);
    let engine = RecordingEngine::new();
    let manager = manager(&store, &engine);
    manager.create(&export).await.unwrap();

    manager
        .pause(&export.id, Some("Paused for maintenance"))
        .await
        .unwrap();

    assert!(store.export(&export.id).unwrap().paused);
    assert_eq!(engine.schedule_paused(&export.id.to_string()), Some(true));

    let pauses: Vec<_> = engine
        .calls()
        .into_iter()
        .filter(|c| matches!(c, EngineCall::Pause(..)))
        .collect();
    assert_eq!(
        pauses,
        vec![EngineCall::Pause(
            export.id.to_string(),
            Some("Paused for maintenance".to_string())
        )]
    );

    manager.unpause(&export.id, None).await.unwrap();
    assert!(!store.export(&export.id).unwrap().paused);
    assert_eq!(engine.schedule_paused(&export.id.to_string()), Some(false));
}

#[tokio::test]
async fn test_pause_unknown_export_does_not_call_engine() {
    let store = InMemoryStore::new();
    let engine = RecordingEngine::new();

    let err = manager(&store, &engine)
        .pause(&BatchExportId::new(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, BatchExportError::BatchExportNotFound(_)));
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn test_engine_failure_leaves_flag_written() {
    let export = s3_batch_export();
    let store = InMemoryStore::with_export(&export);
    let engine = RecordingEngine::new();
    let manager = manager(&store, &engine);
    manager.create(&export).await.unwrap();

    engine.fail_next(EngineError::ServerError {
        status: 503,
        message: "unavailable".to_string(),
    });
    let err = manager.pause(&export.id, None).await.unwrap_err();

    match err {
        BatchExportError::PartialSyncFailure {
            batch_export_id,
            paused,
            source,
        } => {
            assert_eq!(batch_export_id, export.id.to_string());
            assert!(paused);
            assert!(matches!(
                *source,
                BatchExportError::Engine(EngineError::ServerError { status: 503, .. })
            ));
        }
        other => panic!("expected PartialSyncFailure, got {other:?}"),
    }

    assert!(store.export(&export.id).unwrap().paused);
    assert_eq!(engine.schedule_paused(&export.id.to_string()), Some(false));

    // Repeating the call reconciles the schedule
    manager.pause(&export.id, None).await.unwrap();
    assert_eq!(engine.schedule_paused(&export.id.to_string()), Some(true));
}

#[tokio::test]
async fn test_missing_schedule_is_a_partial_sync_failure() {
    let export = s3_batch_export();
    let store = InMemoryStore::with_export(&export);
    let engine = RecordingEngine::new();

    let err = manager(&store, &engine)
        .unpause(&export.id, None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BatchExportError::PartialSyncFailure { paused: false, .. }
    ));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_delete_removes_schedule_only() {
    let export = s3_batch_export();
    let store = InMemoryStore::with_export(&export);
    let engine = RecordingEngine::new();
    let manager = manager(&store, &engine);
    manager.create(&export).await.unwrap();

    manager.delete(&export.id).await.unwrap();

    assert_eq!(engine.schedule_paused(&export.id.to_string()), None);
    assert!(store.export(&export.id).is_some());
    assert!(matches!(
        manager.delete(&export.id).await,
        Err(BatchExportError::ScheduleNotFound(_))
    ));
}
