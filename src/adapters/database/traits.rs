//! Storage abstraction traits
//!
//! The relational store is reached only through these traits, so the core
//! services can be exercised against an in-memory implementation.

use crate::domain::ids::{BatchExportId, RunId};
use crate::domain::{BatchExport, BatchExportRun, Result, RunStatus};
use async_trait::async_trait;

/// Outcome of a guarded run status update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatusUpdate {
    /// The status was written
    Updated,

    /// The run had already reached this terminal status; nothing was written
    AlreadyTerminal(RunStatus),

    /// No run with the given id exists
    NotFound,
}

/// Persistence for export definitions
#[async_trait]
pub trait BatchExportStore: Send + Sync {
    /// Test the store connection
    ///
    /// # Errors
    ///
    /// Returns an error if the connection test fails.
    async fn test_connection(&self) -> Result<()>;

    /// Load an export definition
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` when no export has this id.
    async fn get_batch_export(&self, id: &BatchExportId) -> Result<Option<BatchExport>>;

    /// Insert or replace an export definition, its team and its destination
    async fn upsert_batch_export(&self, export: &BatchExport) -> Result<()>;

    /// Delete an export definition
    ///
    /// # Returns
    ///
    /// Returns `true` if a row was removed.
    async fn delete_batch_export(&self, id: &BatchExportId) -> Result<bool>;

    /// Set the paused flag and bump `last_updated_at`
    ///
    /// # Returns
    ///
    /// Returns the number of rows changed: `0` when the export does not exist.
    async fn set_paused(&self, id: &BatchExportId, paused: bool) -> Result<u64>;
}

/// Persistence for run records
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Insert a new run
    async fn insert_run(&self, run: &BatchExportRun) -> Result<()>;

    /// Insert a run keyed by its workflow execution
    ///
    /// When a run with the same `(workflow_id, workflow_run_id)` already
    /// exists, nothing is inserted and the existing run is returned.
    async fn insert_run_for_execution(&self, run: &BatchExportRun) -> Result<BatchExportRun>;

    /// Record the workflow execution of a run created without one
    ///
    /// Only a run of `batch_export_id` whose workflow ids are still unset is
    /// changed, in a single conditional write.
    ///
    /// # Returns
    ///
    /// Returns the updated run, or `Ok(None)` when no run matched.
    async fn attach_execution(
        &self,
        id: &RunId,
        batch_export_id: &BatchExportId,
        workflow_id: &str,
        workflow_run_id: &str,
    ) -> Result<Option<BatchExportRun>>;

    /// Set a run's status unless the run is already terminal
    ///
    /// The check and the write happen in one statement, so two concurrent
    /// updates can never move a run out of a terminal status.
    async fn update_run_status(&self, id: &RunId, status: RunStatus) -> Result<RunStatusUpdate>;

    /// Load a run
    async fn get_run(&self, id: &RunId) -> Result<Option<BatchExportRun>>;

    /// Runs of an export, newest first
    async fn list_runs(
        &self,
        batch_export_id: &BatchExportId,
        limit: usize,
    ) -> Result<Vec<BatchExportRun>>;
}
