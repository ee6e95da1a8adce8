//! Schedule management
//!
//! Every export is registered as one recurring schedule in the engine, with
//! schedule id and action workflow id both equal to the export id.

use crate::adapters::database::traits::BatchExportStore;
use crate::adapters::temporal::models::{
    CreateScheduleRequest, ScheduleActionStartWorkflow, ScheduleDescription, ScheduleSpec,
    ScheduleState, SearchAttributes,
};
use crate::adapters::temporal::traits::WorkflowEngine;
use crate::core::destinations::{DestinationRegistry, InputContext};
use crate::domain::ids::BatchExportId;
use crate::domain::{BatchExport, BatchExportError, Result};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Search attributes attached to an export's schedule and to every workflow
/// it starts
pub fn search_attributes(export: &BatchExport) -> SearchAttributes {
    let mut attributes = SearchAttributes::new();
    attributes.insert(
        "DestinationId".to_string(),
        vec![Value::from(export.destination.id.to_string())],
    );
    attributes.insert(
        "DestinationType".to_string(),
        vec![Value::from(export.destination.destination_type.clone())],
    );
    attributes.insert("TeamId".to_string(), vec![Value::from(export.team.id)]);
    attributes.insert(
        "TeamName".to_string(),
        vec![Value::from(export.team.name.clone())],
    );
    attributes.insert(
        "BatchExportId".to_string(),
        vec![Value::from(export.id.to_string())],
    );
    attributes
}

/// Note recorded on a freshly created schedule
pub fn creation_note(export: &BatchExport) -> String {
    format!(
        "Schedule created for BatchExport {} to Destination {} in Team {}.",
        export.id, export.destination.id, export.team.id
    )
}

/// Keeps engine schedules and local export state in step
pub struct ScheduleManager {
    exports: Arc<dyn BatchExportStore + Send + Sync>,
    engine: Arc<dyn WorkflowEngine + Send + Sync>,
    registry: Arc<DestinationRegistry>,
    task_queue: String,
}

impl ScheduleManager {
    pub fn new(
        exports: Arc<dyn BatchExportStore + Send + Sync>,
        engine: Arc<dyn WorkflowEngine + Send + Sync>,
        registry: Arc<DestinationRegistry>,
        task_queue: impl Into<String>,
    ) -> Self {
        Self {
            exports,
            engine,
            registry,
            task_queue: task_queue.into(),
        }
    }

    /// Build the schedule registration for an export
    ///
    /// # Errors
    ///
    /// Returns [`BatchExportError::UnknownDestinationType`] or
    /// [`BatchExportError::InvalidWorkflowInputs`] when the destination
    /// cannot be turned into workflow inputs.
    pub fn build_schedule_request(&self, export: &BatchExport) -> Result<CreateScheduleRequest> {
        let workflow = self.registry.resolve(&export.destination.destination_type)?;
        let input = workflow.build_inputs(export, InputContext::scheduled())?;
        let attributes = search_attributes(export);

        Ok(CreateScheduleRequest {
            schedule_id: export.schedule_id(),
            action: ScheduleActionStartWorkflow {
                workflow_type: workflow.name().to_string(),
                workflow_id: export.schedule_id(),
                task_queue: self.task_queue.clone(),
                input,
                search_attributes: attributes.clone(),
            },
            spec: ScheduleSpec::every(export.interval.as_seconds()),
            state: ScheduleState {
                note: Some(creation_note(export)),
                paused: export.paused,
            },
            search_attributes: attributes,
            request_id: Uuid::new_v4().to_string(),
        })
    }

    /// Register the export's schedule in the engine
    ///
    /// The schedule starts paused when the export is paused.
    ///
    /// # Errors
    ///
    /// Returns [`BatchExportError::ScheduleAlreadyExists`] if a schedule with
    /// the export's id is already registered.
    pub async fn create(&self, export: &BatchExport) -> Result<()> {
        let request = self.build_schedule_request(export)?;
        self.engine.create_schedule(&request).await?;

        tracing::info!(
            batch_export_id = %export.id,
            workflow = %request.action.workflow_type,
            interval = %export.interval,
            paused = export.paused,
            "Schedule created"
        );
        Ok(())
    }

    /// Pause the export and its schedule
    ///
    /// # Errors
    ///
    /// See [`ScheduleManager::unpause`].
    pub async fn pause(&self, id: &BatchExportId, note: Option<&str>) -> Result<()> {
        self.set_paused(id, true, note).await
    }

    /// Unpause the export and its schedule
    ///
    /// The local flag is written first. If no export has this id the engine is
    /// not called.
    ///
    /// # Errors
    ///
    /// - [`BatchExportError::BatchExportNotFound`] when no export has this id
    /// - [`BatchExportError::PartialSyncFailure`] when the flag was written but
    ///   the engine call failed; the flag is left as written
    pub async fn unpause(&self, id: &BatchExportId, note: Option<&str>) -> Result<()> {
        self.set_paused(id, false, note).await
    }

    async fn set_paused(&self, id: &BatchExportId, paused: bool, note: Option<&str>) -> Result<()> {
        let rows = self.exports.set_paused(id, paused).await?;
        if rows == 0 {
            return Err(BatchExportError::BatchExportNotFound(id.to_string()));
        }

        let schedule_id = id.schedule_id();
        let synced = if paused {
            self.engine.pause_schedule(&schedule_id, note).await
        } else {
            self.engine.unpause_schedule(&schedule_id, note).await
        };

        if let Err(e) = synced {
            tracing::error!(
                batch_export_id = %id,
                paused,
                error = %e,
                "Local paused flag written but schedule update failed"
            );
            return Err(BatchExportError::PartialSyncFailure {
                batch_export_id: id.to_string(),
                paused,
                source: Box::new(e),
            });
        }

        tracing::info!(batch_export_id = %id, paused, "BatchExport paused state updated");
        Ok(())
    }

    /// Delete the export's schedule
    ///
    /// Executions already running are left to finish.
    pub async fn delete(&self, id: &BatchExportId) -> Result<()> {
        self.engine.delete_schedule(&id.schedule_id()).await
    }

    /// Current state of the export's schedule
    pub async fn describe(&self, id: &BatchExportId) -> Result<ScheduleDescription> {
        self.engine.describe_schedule(&id.schedule_id()).await
    }
}
