//! In-memory store and engine shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use batch_exports::adapters::database::{BatchExportStore, RunStatusUpdate, RunStore};
use batch_exports::adapters::temporal::{
    CreateScheduleRequest, ScheduleDescription, StartWorkflowRequest, WorkflowEngine,
    WorkflowHandle,
};
use batch_exports::domain::{
    BatchExport, BatchExportError, BatchExportId, BatchExportRun, Destination, EngineError,
    ExportInterval, Result, RunId, RunStatus, Team,
};
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const TASK_QUEUE: &str = "test-task-queue";

/// An export to the S3 destination with a complete destination config
pub fn s3_batch_export() -> BatchExport {
    let config: Map<String, Value> = match json!({
        "bucket_name": "exports-bucket",
        "region": "us-east-1",
        "key_template": "events/{year}/{month}/{day}",
        "aws_access_key_id": "AKIAEXAMPLE",
        "aws_secret_access_key": "secret-access-key",
    }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    };

    BatchExport {
        id: BatchExportId::new(),
        team: Team {
            id: 2,
            name: "Analytics".to_string(),
        },
        name: "Events to S3".to_string(),
        destination: Destination {
            id: Uuid::new_v4(),
            destination_type: "S3".to_string(),
            config,
        },
        interval: ExportInterval::Hour,
        paused: false,
        created_at: Utc::now(),
        last_updated_at: Utc::now(),
    }
}

#[derive(Default)]
struct StoreState {
    exports: HashMap<BatchExportId, BatchExport>,
    runs: HashMap<RunId, BatchExportRun>,
}

/// Both store ports over one in-memory table set
///
/// Mirrors the PostgreSQL adapter: execution-keyed inserts are idempotent and
/// status updates never touch terminal runs.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_export(export: &BatchExport) -> Arc<Self> {
        let store = Self::new();
        store
            .state
            .lock()
            .unwrap()
            .exports
            .insert(export.id, export.clone());
        store
    }

    pub fn export(&self, id: &BatchExportId) -> Option<BatchExport> {
        self.state.lock().unwrap().exports.get(id).cloned()
    }

    pub fn runs(&self) -> Vec<BatchExportRun> {
        self.state.lock().unwrap().runs.values().cloned().collect()
    }

    pub fn run_count(&self) -> usize {
        self.state.lock().unwrap().runs.len()
    }
}

#[async_trait]
impl BatchExportStore for InMemoryStore {
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn get_batch_export(&self, id: &BatchExportId) -> Result<Option<BatchExport>> {
        Ok(self.export(id))
    }

    async fn upsert_batch_export(&self, export: &BatchExport) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .exports
            .insert(export.id, export.clone());
        Ok(())
    }

    async fn delete_batch_export(&self, id: &BatchExportId) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let removed = state.exports.remove(id).is_some();
        state.runs.retain(|_, run| run.batch_export_id != *id);
        Ok(removed)
    }

    async fn set_paused(&self, id: &BatchExportId, paused: bool) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        match state.exports.get_mut(id) {
            Some(export) => {
                export.paused = paused;
                export.last_updated_at = Utc::now();
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[async_trait]
impl RunStore for InMemoryStore {
    async fn insert_run(&self, run: &BatchExportRun) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.exports.contains_key(&run.batch_export_id) {
            return Err(BatchExportError::Database(format!(
                "foreign key violation: batch export {} does not exist",
                run.batch_export_id
            )));
        }
        state.runs.insert(run.id, run.clone());
        Ok(())
    }

    async fn insert_run_for_execution(&self, run: &BatchExportRun) -> Result<BatchExportRun> {
        {
            let state = self.state.lock().unwrap();
            let existing = state.runs.values().find(|r| {
                r.workflow_id.is_some()
                    && r.workflow_id == run.workflow_id
                    && r.workflow_run_id == run.workflow_run_id
            });
            if let Some(existing) = existing {
                return Ok(existing.clone());
            }
        }
        self.insert_run(run).await?;
        Ok(run.clone())
    }

    async fn attach_execution(
        &self,
        id: &RunId,
        batch_export_id: &BatchExportId,
        workflow_id: &str,
        workflow_run_id: &str,
    ) -> Result<Option<BatchExportRun>> {
        let mut state = self.state.lock().unwrap();
        match state.runs.get_mut(id) {
            Some(run) if run.batch_export_id == *batch_export_id && run.workflow_id.is_none() => {
                run.workflow_id = Some(workflow_id.to_string());
                run.workflow_run_id = Some(workflow_run_id.to_string());
                run.last_updated_at = Utc::now();
                Ok(Some(run.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn update_run_status(&self, id: &RunId, status: RunStatus) -> Result<RunStatusUpdate> {
        let mut state = self.state.lock().unwrap();
        match state.runs.get_mut(id) {
            None => Ok(RunStatusUpdate::NotFound),
            Some(run) if run.status.is_terminal() => Ok(RunStatusUpdate::AlreadyTerminal(run.status)),
            Some(run) => {
                run.status = status;
                run.last_updated_at = Utc::now();
                Ok(RunStatusUpdate::Updated)
            }
        }
    }

    async fn get_run(&self, id: &RunId) -> Result<Option<BatchExportRun>> {
        Ok(self.state.lock().unwrap().runs.get(id).cloned())
    }

    async fn list_runs(
        &self,
        batch_export_id: &BatchExportId,
        limit: usize,
    ) -> Result<Vec<BatchExportRun>> {
        let state = self.state.lock().unwrap();
        let mut runs: Vec<_> = state
            .runs
            .values()
            .filter(|r| r.batch_export_id == *batch_export_id)
            .cloned()
            .collect();
        runs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        runs.truncate(limit);
        Ok(runs)
    }
}

/// A call received by [`RecordingEngine`]
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Create(CreateScheduleRequest),
    Pause(String, Option<String>),
    Unpause(String, Option<String>),
    Delete(String),
    Describe(String),
    Execute(StartWorkflowRequest),
}

#[derive(Default)]
struct EngineState {
    schedules: HashMap<String, (bool, Option<String>)>,
    calls: Vec<EngineCall>,
    fail_next: Option<EngineError>,
}

/// Workflow engine that records every call and keeps schedules in memory
#[derive(Default)]
pub struct RecordingEngine {
    state: Mutex<EngineState>,
}

impl RecordingEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make the next call fail with `error`
    pub fn fail_next(&self, error: EngineError) {
        self.state.lock().unwrap().fail_next = Some(error);
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn executions(&self) -> Vec<StartWorkflowRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::Execute(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn schedule_paused(&self, schedule_id: &str) -> Option<bool> {
        self.state
            .lock()
            .unwrap()
            .schedules
            .get(schedule_id)
            .map(|(paused, _)| *paused)
    }

    fn record(&self, call: EngineCall) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match state.fail_next.take() {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }

    fn set_paused(&self, schedule_id: &str, paused: bool, note: Option<&str>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.schedules.get_mut(schedule_id) {
            Some(schedule) => {
                *schedule = (paused, note.map(str::to_string));
                Ok(())
            }
            None => Err(BatchExportError::ScheduleNotFound(schedule_id.to_string())),
        }
    }
}

#[async_trait]
impl WorkflowEngine for RecordingEngine {
    async fn create_schedule(&self, request: &CreateScheduleRequest) -> Result<()> {
        self.record(EngineCall::Create(request.clone()))?;
        let mut state = self.state.lock().unwrap();
        if state.schedules.contains_key(&request.schedule_id) {
            return Err(BatchExportError::ScheduleAlreadyExists(
                request.schedule_id.clone(),
            ));
        }
        state.schedules.insert(
            request.schedule_id.clone(),
            (request.state.paused, request.state.note.clone()),
        );
        Ok(())
    }

    async fn pause_schedule(&self, schedule_id: &str, note: Option<&str>) -> Result<()> {
        self.record(EngineCall::Pause(
            schedule_id.to_string(),
            note.map(str::to_string),
        ))?;
        self.set_paused(schedule_id, true, note)
    }

    async fn unpause_schedule(&self, schedule_id: &str, note: Option<&str>) -> Result<()> {
        self.record(EngineCall::Unpause(
            schedule_id.to_string(),
            note.map(str::to_string),
        ))?;
        self.set_paused(schedule_id, false, note)
    }

    async fn delete_schedule(&self, schedule_id: &str) -> Result<()> {
        self.record(EngineCall::Delete(schedule_id.to_string()))?;
        match self.state.lock().unwrap().schedules.remove(schedule_id) {
            Some(_) => Ok(()),
            None => Err(BatchExportError::ScheduleNotFound(schedule_id.to_string())),
        }
    }

    async fn describe_schedule(&self, schedule_id: &str) -> Result<ScheduleDescription> {
        self.record(EngineCall::Describe(schedule_id.to_string()))?;
        let state = self.state.lock().unwrap();
        let (paused, note) = state
            .schedules
            .get(schedule_id)
            .cloned()
            .ok_or_else(|| BatchExportError::ScheduleNotFound(schedule_id.to_string()))?;
        Ok(ScheduleDescription {
            schedule_id: schedule_id.to_string(),
            paused,
            note,
            next_action_times: Vec::new(),
            recent_actions: Vec::new(),
        })
    }

    async fn execute_workflow(&self, request: &StartWorkflowRequest) -> Result<WorkflowHandle> {
        self.record(EngineCall::Execute(request.clone()))?;
        Ok(WorkflowHandle {
            workflow_id: request.workflow_id.clone(),
            run_id: Uuid::new_v4().to_string(),
        })
    }
}
