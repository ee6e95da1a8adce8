//! Backfill orchestration
//!
//! A backfill exports an explicit historical interval with one direct
//! workflow execution, outside the export's schedule.

use crate::adapters::database::traits::BatchExportStore;
use crate::adapters::temporal::models::StartWorkflowRequest;
use crate::adapters::temporal::traits::WorkflowEngine;
use crate::core::destinations::{DestinationRegistry, InputContext};
use crate::core::runs::RunTracker;
use crate::core::schedules::search_attributes;
use crate::domain::ids::BatchExportId;
use crate::domain::{BatchExportError, BatchExportRun, Result, RunStatus};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Starts backfill executions
pub struct BackfillOrchestrator {
    exports: Arc<dyn BatchExportStore + Send + Sync>,
    engine: Arc<dyn WorkflowEngine + Send + Sync>,
    registry: Arc<DestinationRegistry>,
    tracker: RunTracker,
    task_queue: String,
}

impl BackfillOrchestrator {
    pub fn new(
        exports: Arc<dyn BatchExportStore + Send + Sync>,
        engine: Arc<dyn WorkflowEngine + Send + Sync>,
        registry: Arc<DestinationRegistry>,
        tracker: RunTracker,
        task_queue: impl Into<String>,
    ) -> Self {
        Self {
            exports,
            engine,
            registry,
            tracker,
            task_queue: task_queue.into(),
        }
    }

    /// Create a run for `[start_at, end_at)` and start its execution
    ///
    /// The execution's workflow id is the run id. Returns as soon as the
    /// engine accepted the execution, without waiting for it to finish.
    ///
    /// # Errors
    ///
    /// - [`BatchExportError::Validation`] when `start_at >= end_at`
    /// - [`BatchExportError::BatchExportNotFound`] for an unknown export
    /// - [`BatchExportError::UnknownDestinationType`] or
    ///   [`BatchExportError::InvalidWorkflowInputs`]; no run is created
    /// - the engine error when the execution could not be started; the run
    ///   is then marked `Failed`
    pub async fn backfill(
        &self,
        batch_export_id: &BatchExportId,
        start_at: Option<DateTime<Utc>>,
        end_at: Option<DateTime<Utc>>,
    ) -> Result<BatchExportRun> {
        if let (Some(start), Some(end)) = (start_at, end_at) {
            if start >= end {
                return Err(BatchExportError::Validation(format!(
                    "Backfill start {start} must be before end {end}"
                )));
            }
        }

        let export = self
            .exports
            .get_batch_export(batch_export_id)
            .await?
            .ok_or_else(|| BatchExportError::BatchExportNotFound(batch_export_id.to_string()))?;

        let workflow = self.registry.resolve(&export.destination.destination_type)?;
        let input = workflow.build_inputs(&export, InputContext::interval(start_at, end_at))?;

        let run = self
            .tracker
            .create_backfill_run(&export, start_at, end_at)
            .await?;

        let request = StartWorkflowRequest::new(
            workflow.name(),
            run.id.to_string(),
            self.task_queue.clone(),
            input,
        )
        .with_search_attributes(search_attributes(&export));

        match self.engine.execute_workflow(&request).await {
            Ok(handle) => {
                tracing::info!(
                    batch_export_id = %export.id,
                    run_id = %run.id,
                    workflow_run_id = %handle.run_id,
                    "Backfill started"
                );
                Ok(run)
            }
            Err(e) => {
                crate::log_error_with_context!(&e, "Failed to start backfill execution");
                if let Err(mark_err) = self
                    .tracker
                    .update_run_status(&run.id, RunStatus::Failed)
                    .await
                {
                    tracing::error!(
                        run_id = %run.id,
                        error = %mark_err,
                        "Failed to mark backfill run as Failed"
                    );
                }
                Err(e)
            }
        }
    }
}
