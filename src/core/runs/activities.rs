//! Workflow activity entry points
//!
//! Activities receive plain string payloads from the engine; these functions
//! parse them and delegate to [`RunTracker`].

use crate::core::runs::tracker::RunTracker;
use crate::domain::ids::{BatchExportId, RunId};
use crate::domain::{BatchExportError, Result, RunStatus};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of the executing workflow, as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityInfo {
    pub workflow_id: String,
    pub workflow_run_id: String,
}

/// Inputs of the `create_export_run` activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBatchExportRunInputs {
    pub team_id: i64,
    pub batch_export_id: String,
    pub data_interval_start: String,
    pub data_interval_end: String,
}

/// Inputs of the `update_export_run_status` activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBatchExportRunStatusInputs {
    pub id: String,
    pub status: String,
}

/// Parse an ISO-8601 timestamp
///
/// Values without an offset are taken as UTC; a bare date is midnight UTC.
///
/// # Errors
///
/// Returns [`BatchExportError::Validation`] for anything else.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(BatchExportError::Validation(format!(
        "Invalid ISO-8601 timestamp '{raw}'"
    )))
}

/// Create the run for the executing workflow and return its id
///
/// Redelivery with the same [`ActivityInfo`] returns the id of the run
/// created the first time.
pub async fn create_export_run(
    tracker: &RunTracker,
    info: &ActivityInfo,
    inputs: &CreateBatchExportRunInputs,
) -> Result<String> {
    tracing::info!(team_id = inputs.team_id, "Creating BatchExportRun");

    let batch_export_id: BatchExportId = inputs
        .batch_export_id
        .parse()
        .map_err(BatchExportError::Validation)?;
    let start = parse_timestamp(&inputs.data_interval_start)?;
    let end = parse_timestamp(&inputs.data_interval_end)?;

    let run = tracker
        .create_run(
            inputs.team_id,
            &info.workflow_id,
            &info.workflow_run_id,
            batch_export_id,
            Some(start),
            Some(end),
        )
        .await?;

    Ok(run.id.to_string())
}

/// Update the status of a run
pub async fn update_export_run_status(
    tracker: &RunTracker,
    inputs: &UpdateBatchExportRunStatusInputs,
) -> Result<()> {
    let run_id: RunId = inputs.id.parse().map_err(BatchExportError::Validation)?;
    let status: RunStatus = inputs.status.parse().map_err(BatchExportError::Validation)?;
    tracker.update_run_status(&run_id, status).await
}
