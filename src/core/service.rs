//! Blocking service API
//!
//! [`BatchExportService`] is the synchronous surface over the async
//! components. It owns a current-thread runtime and drives every call with
//! `block_on`, so nothing runs in the background between calls.

use crate::adapters::database::factory::create_stores;
use crate::adapters::database::traits::{BatchExportStore, RunStore};
use crate::adapters::temporal::models::{ScheduleDescription, StartWorkflowRequest, WorkflowHandle};
use crate::adapters::temporal::traits::WorkflowEngine;
use crate::adapters::temporal::TemporalClient;
use crate::config::BatchExportsConfig;
use crate::core::backfill::BackfillOrchestrator;
use crate::core::destinations::DestinationRegistry;
use crate::core::runs::RunTracker;
use crate::core::schedules::ScheduleManager;
use crate::domain::ids::{BatchExportId, RunId};
use crate::domain::{BatchExport, BatchExportError, BatchExportRun, Result, RunStatus};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};
use uuid::Uuid;

/// Synchronous entry point for every batch export operation
///
/// Must not be called from within an async runtime: `block_on` panics there.
pub struct BatchExportService {
    runtime: Runtime,
    exports: Arc<dyn BatchExportStore + Send + Sync>,
    engine: Arc<dyn WorkflowEngine + Send + Sync>,
    registry: Arc<DestinationRegistry>,
    tracker: RunTracker,
    schedules: ScheduleManager,
    backfills: BackfillOrchestrator,
    task_queue: String,
}

fn build_runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| BatchExportError::Io(format!("Failed to build runtime: {e}")))
}

impl BatchExportService {
    /// Connect to PostgreSQL and the workflow engine
    ///
    /// Runs the schema migration and registers the default destinations.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime, the stores or the engine client
    /// cannot be created.
    pub fn connect(config: &BatchExportsConfig) -> Result<Self> {
        let runtime = build_runtime()?;
        let (exports, runs) = runtime.block_on(create_stores(&config.postgresql))?;
        let engine = Arc::new(TemporalClient::new(config.temporal.clone())?);

        tracing::info!(
            namespace = %engine.namespace(),
            task_queue = %engine.task_queue(),
            "BatchExportService connected"
        );

        Self::with_runtime(
            runtime,
            exports,
            runs,
            engine,
            DestinationRegistry::with_defaults(),
            config.temporal.task_queue.clone(),
        )
    }

    /// Build a service over arbitrary port implementations
    pub fn new(
        exports: Arc<dyn BatchExportStore + Send + Sync>,
        runs: Arc<dyn RunStore + Send + Sync>,
        engine: Arc<dyn WorkflowEngine + Send + Sync>,
        registry: DestinationRegistry,
        task_queue: impl Into<String>,
    ) -> Result<Self> {
        Self::with_runtime(build_runtime()?, exports, runs, engine, registry, task_queue)
    }

    fn with_runtime(
        runtime: Runtime,
        exports: Arc<dyn BatchExportStore + Send + Sync>,
        runs: Arc<dyn RunStore + Send + Sync>,
        engine: Arc<dyn WorkflowEngine + Send + Sync>,
        registry: DestinationRegistry,
        task_queue: impl Into<String>,
    ) -> Result<Self> {
        let task_queue = task_queue.into();
        let registry = Arc::new(registry);
        let tracker = RunTracker::new(runs);

        let schedules = ScheduleManager::new(
            exports.clone(),
            engine.clone(),
            registry.clone(),
            task_queue.clone(),
        );
        let backfills = BackfillOrchestrator::new(
            exports.clone(),
            engine.clone(),
            registry.clone(),
            tracker.clone(),
            task_queue.clone(),
        );

        Ok(Self {
            runtime,
            exports,
            engine,
            registry,
            tracker,
            schedules,
            backfills,
            task_queue,
        })
    }

    pub fn registry(&self) -> &DestinationRegistry {
        &self.registry
    }

    /// Run tracker, for activity entry points
    pub fn tracker(&self) -> &RunTracker {
        &self.tracker
    }

    /// Check that the store is reachable
    pub fn test_connection(&self) -> Result<()> {
        self.runtime.block_on(self.exports.test_connection())
    }

    /// Register the export's schedule in the engine
    pub fn create_batch_export(&self, export: &BatchExport) -> Result<()> {
        self.runtime.block_on(self.schedules.create(export))
    }

    /// Store a new export definition and register its schedule
    ///
    /// The stored row is removed again when registration fails, unless the
    /// engine already holds a schedule for this export.
    ///
    /// # Errors
    ///
    /// Returns [`BatchExportError::Validation`] without touching the store or
    /// the engine if a definition with this id is already stored.
    pub fn register_batch_export(&self, export: &BatchExport) -> Result<()> {
        self.runtime.block_on(async {
            if self.exports.get_batch_export(&export.id).await?.is_some() {
                return Err(BatchExportError::Validation(format!(
                    "BatchExport {} already exists",
                    export.id
                )));
            }

            self.exports.upsert_batch_export(export).await?;

            let err = match self.schedules.create(export).await {
                Ok(()) => return Ok(()),
                Err(e) => e,
            };

            if matches!(err, BatchExportError::ScheduleAlreadyExists(_)) {
                tracing::warn!(
                    batch_export_id = %export.id,
                    "Schedule already registered; keeping the stored BatchExport"
                );
                return Err(err);
            }

            if let Err(cleanup) = self.exports.delete_batch_export(&export.id).await {
                tracing::error!(
                    batch_export_id = %export.id,
                    error = %cleanup,
                    "Failed to remove stored BatchExport"
                );
            }
            Err(err)
        })
    }

    pub fn pause_batch_export(&self, id: &BatchExportId, note: Option<&str>) -> Result<()> {
        self.runtime.block_on(self.schedules.pause(id, note))
    }

    pub fn unpause_batch_export(&self, id: &BatchExportId, note: Option<&str>) -> Result<()> {
        self.runtime.block_on(self.schedules.unpause(id, note))
    }

    /// Delete the schedule, then the local definition
    ///
    /// If the schedule cannot be deleted the local row is kept. Runs of the
    /// export are removed with it.
    pub fn delete_batch_export(&self, id: &BatchExportId) -> Result<()> {
        self.runtime.block_on(async {
            self.schedules.delete(id).await?;

            if !self.exports.delete_batch_export(id).await? {
                tracing::warn!(
                    batch_export_id = %id,
                    "Schedule deleted but no local BatchExport row existed"
                );
            }
            Ok(())
        })
    }

    pub fn describe_schedule(&self, id: &BatchExportId) -> Result<ScheduleDescription> {
        self.runtime.block_on(self.schedules.describe(id))
    }

    /// Start a backfill over `[start_at, end_at)`
    ///
    /// Returns once the execution is accepted by the engine.
    pub fn backfill_export(
        &self,
        id: &BatchExportId,
        start_at: Option<DateTime<Utc>>,
        end_at: Option<DateTime<Utc>>,
    ) -> Result<BatchExportRun> {
        self.runtime
            .block_on(self.backfills.backfill(id, start_at, end_at))
    }

    pub fn create_batch_export_run(
        &self,
        team_id: i64,
        workflow_id: &str,
        workflow_run_id: &str,
        batch_export_id: BatchExportId,
        data_interval_start: Option<DateTime<Utc>>,
        data_interval_end: Option<DateTime<Utc>>,
    ) -> Result<BatchExportRun> {
        self.runtime.block_on(self.tracker.create_run(
            team_id,
            workflow_id,
            workflow_run_id,
            batch_export_id,
            data_interval_start,
            data_interval_end,
        ))
    }

    pub fn update_batch_export_run_status(&self, run_id: &RunId, status: RunStatus) -> Result<()> {
        self.runtime
            .block_on(self.tracker.update_run_status(run_id, status))
    }

    pub fn get_batch_export(&self, id: &BatchExportId) -> Result<BatchExport> {
        self.runtime
            .block_on(self.exports.get_batch_export(id))?
            .ok_or_else(|| BatchExportError::BatchExportNotFound(id.to_string()))
    }

    /// Insert or replace an export definition without touching its schedule
    pub fn save_batch_export(&self, export: &BatchExport) -> Result<()> {
        self.runtime.block_on(self.exports.upsert_batch_export(export))
    }

    pub fn get_run(&self, run_id: &RunId) -> Result<BatchExportRun> {
        self.runtime.block_on(self.tracker.get_run(run_id))
    }

    pub fn list_runs(&self, id: &BatchExportId, limit: usize) -> Result<Vec<BatchExportRun>> {
        self.runtime.block_on(self.tracker.list_runs(id, limit))
    }

    /// Start one execution of a registered workflow from `key=value` arguments
    ///
    /// The execution gets a fresh workflow id and no search attributes.
    ///
    /// # Errors
    ///
    /// Returns [`BatchExportError::Validation`] if no workflow has this name,
    /// [`BatchExportError::InvalidWorkflowInputs`] if the arguments do not
    /// parse into its inputs.
    pub fn execute_workflow(&self, name: &str, args: &[String]) -> Result<WorkflowHandle> {
        let workflow = self.registry.find_workflow(name).ok_or_else(|| {
            BatchExportError::Validation(format!("No workflow registered with name '{name}'"))
        })?;
        let input = workflow.parse_inputs(args)?;

        let request = StartWorkflowRequest::new(
            workflow.name(),
            Uuid::new_v4().to_string(),
            self.task_queue.clone(),
            input,
        );

        let handle = self
            .runtime
            .block_on(self.engine.execute_workflow(&request))?;
        tracing::info!(
            workflow = name,
            workflow_id = %handle.workflow_id,
            workflow_run_id = %handle.run_id,
            "Workflow execution started"
        );
        Ok(handle)
    }
}
