//! Workflow engine port

use crate::adapters::temporal::models::{
    CreateScheduleRequest, ScheduleDescription, StartWorkflowRequest, WorkflowHandle,
};
use crate::domain::Result;
use async_trait::async_trait;

/// Durable workflow engine operations used by the schedule manager and the
/// backfill orchestrator
///
/// Implementations report a schedule id conflict as
/// [`BatchExportError::ScheduleAlreadyExists`] and a missing schedule as
/// [`BatchExportError::ScheduleNotFound`].
///
/// [`BatchExportError::ScheduleAlreadyExists`]: crate::domain::BatchExportError::ScheduleAlreadyExists
/// [`BatchExportError::ScheduleNotFound`]: crate::domain::BatchExportError::ScheduleNotFound
#[async_trait]
pub trait WorkflowEngine: Send + Sync {
    /// Register a recurring schedule
    async fn create_schedule(&self, request: &CreateScheduleRequest) -> Result<()>;

    /// Stop a schedule from firing; in-flight executions are unaffected
    async fn pause_schedule(&self, schedule_id: &str, note: Option<&str>) -> Result<()>;

    /// Resume a paused schedule
    async fn unpause_schedule(&self, schedule_id: &str, note: Option<&str>) -> Result<()>;

    /// Remove a schedule
    async fn delete_schedule(&self, schedule_id: &str) -> Result<()>;

    /// Read a schedule's state, upcoming and recent actions
    async fn describe_schedule(&self, schedule_id: &str) -> Result<ScheduleDescription>;

    /// Start one workflow execution and return once the engine accepted it
    async fn execute_workflow(&self, request: &StartWorkflowRequest) -> Result<WorkflowHandle>;
}
