//! Run lifecycle tracking
//!
//! Run creation and status updates arrive from executing workflows with
//! at-least-once delivery, so both operations tolerate redelivery.

use crate::adapters::database::traits::{RunStatusUpdate, RunStore};
use crate::domain::ids::{BatchExportId, RunId};
use crate::domain::{BatchExport, BatchExportError, BatchExportRun, Result, RunStatus};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Creates and updates [`BatchExportRun`] records
#[derive(Clone)]
pub struct RunTracker {
    runs: Arc<dyn RunStore + Send + Sync>,
}

impl RunTracker {
    pub fn new(runs: Arc<dyn RunStore + Send + Sync>) -> Self {
        Self { runs }
    }

    /// Record a run started by a workflow execution
    ///
    /// A second call for the same `(workflow_id, workflow_run_id)` returns the
    /// run created by the first one instead of inserting another row. A
    /// backfill execution, whose workflow id is the id of a run created ahead
    /// of it, gets that run with its workflow ids filled in.
    ///
    /// # Errors
    ///
    /// Returns [`BatchExportError::Database`] if the store rejects the insert,
    /// e.g. because the team or export does not exist.
    pub async fn create_run(
        &self,
        team_id: i64,
        workflow_id: &str,
        workflow_run_id: &str,
        batch_export_id: BatchExportId,
        data_interval_start: Option<DateTime<Utc>>,
        data_interval_end: Option<DateTime<Utc>>,
    ) -> Result<BatchExportRun> {
        if let Ok(backfill_run_id) = workflow_id.parse::<RunId>() {
            if let Some(run) = self
                .runs
                .attach_execution(
                    &backfill_run_id,
                    &batch_export_id,
                    workflow_id,
                    workflow_run_id,
                )
                .await?
            {
                tracing::info!(
                    run_id = %run.id,
                    batch_export_id = %batch_export_id,
                    workflow_run_id,
                    "Attached workflow execution to backfill BatchExportRun"
                );
                return Ok(run);
            }
        }

        let candidate = BatchExportRun::for_execution(
            team_id,
            batch_export_id,
            workflow_id,
            workflow_run_id,
            data_interval_start,
            data_interval_end,
        );

        let run = self.runs.insert_run_for_execution(&candidate).await?;

        if run.id == candidate.id {
            tracing::info!(
                run_id = %run.id,
                team_id,
                batch_export_id = %batch_export_id,
                workflow_id,
                workflow_run_id,
                "Created BatchExportRun"
            );
        } else {
            tracing::info!(
                run_id = %run.id,
                workflow_id,
                workflow_run_id,
                "BatchExportRun already exists for this workflow execution"
            );
        }

        Ok(run)
    }

    /// Move a run to `status`
    ///
    /// Updates to a run that already reached a terminal status are logged and
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`BatchExportError::RunNotFound`] if no run has this id; no row
    /// is created in that case.
    pub async fn update_run_status(&self, run_id: &RunId, status: RunStatus) -> Result<()> {
        match self.runs.update_run_status(run_id, status).await? {
            RunStatusUpdate::Updated => {
                crate::log_run_transition!(run_id, status);
                Ok(())
            }
            RunStatusUpdate::AlreadyTerminal(current) => {
                tracing::warn!(
                    run_id = %run_id,
                    current_status = %current,
                    requested_status = %status,
                    "Ignoring status update for a BatchExportRun in a terminal status"
                );
                Ok(())
            }
            RunStatusUpdate::NotFound => Err(BatchExportError::RunNotFound(run_id.to_string())),
        }
    }

    /// Record a run ahead of a backfill execution
    ///
    /// The run carries no workflow ids until its execution, which uses the
    /// run id as its workflow id, reports back through [`Self::create_run`].
    pub async fn create_backfill_run(
        &self,
        batch_export: &BatchExport,
        data_interval_start: Option<DateTime<Utc>>,
        data_interval_end: Option<DateTime<Utc>>,
    ) -> Result<BatchExportRun> {
        let run = BatchExportRun::for_backfill(
            batch_export.team.id,
            batch_export.id,
            data_interval_start,
            data_interval_end,
        );
        self.runs.insert_run(&run).await?;

        tracing::info!(
            run_id = %run.id,
            batch_export_id = %batch_export.id,
            data_interval_start = ?data_interval_start,
            data_interval_end = ?data_interval_end,
            "Created backfill BatchExportRun"
        );
        Ok(run)
    }

    /// Load a run
    ///
    /// # Errors
    ///
    /// Returns [`BatchExportError::RunNotFound`] if no run has this id.
    pub async fn get_run(&self, run_id: &RunId) -> Result<BatchExportRun> {
        self.runs
            .get_run(run_id)
            .await?
            .ok_or_else(|| BatchExportError::RunNotFound(run_id.to_string()))
    }

    /// Most recent runs of an export, newest first
    pub async fn list_runs(
        &self,
        batch_export_id: &BatchExportId,
        limit: usize,
    ) -> Result<Vec<BatchExportRun>> {
        self.runs.list_runs(batch_export_id, limit).await
    }
}
