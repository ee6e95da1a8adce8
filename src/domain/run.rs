//! Run records and their lifecycle status

use crate::domain::ids::{BatchExportId, RunId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a [`BatchExportRun`]
///
/// `Completed`, `Failed` and `Cancelled` are terminal: once a run reaches one
/// of them its status never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStatus {
    Starting,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    /// Statuses that end a run
    pub const TERMINAL: [RunStatus; 3] =
        [RunStatus::Completed, RunStatus::Failed, RunStatus::Cancelled];

    pub fn is_terminal(&self) -> bool {
        Self::TERMINAL.contains(self)
    }

    /// Name persisted in the store
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Starting => "Starting",
            RunStatus::Running => "Running",
            RunStatus::Completed => "Completed",
            RunStatus::Failed => "Failed",
            RunStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = String;

    /// Accepts the persisted names case-insensitively, so workflows may send
    /// either `Completed` or `COMPLETED`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "starting" => Ok(RunStatus::Starting),
            "running" => Ok(RunStatus::Running),
            "completed" => Ok(RunStatus::Completed),
            "failed" => Ok(RunStatus::Failed),
            "cancelled" => Ok(RunStatus::Cancelled),
            _ => Err(format!(
                "Invalid run status '{s}'. Must be one of: Starting, Running, Completed, Failed, Cancelled"
            )),
        }
    }
}

/// One execution of a [`BatchExport`](crate::domain::BatchExport), either a
/// scheduled tick or a backfill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchExportRun {
    pub id: RunId,
    pub team_id: i64,
    pub batch_export_id: BatchExportId,

    /// Inclusive start of the exported data interval
    pub data_interval_start: Option<DateTime<Utc>>,

    /// Exclusive end of the exported data interval; `None` runs up to now
    pub data_interval_end: Option<DateTime<Utc>>,

    /// Set once the run is executing
    pub workflow_id: Option<String>,
    pub workflow_run_id: Option<String>,

    pub status: RunStatus,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl BatchExportRun {
    /// A run created by an executing workflow for a scheduled tick
    pub fn for_execution(
        team_id: i64,
        batch_export_id: BatchExportId,
        workflow_id: impl Into<String>,
        workflow_run_id: impl Into<String>,
        data_interval_start: Option<DateTime<Utc>>,
        data_interval_end: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RunId::new(),
            team_id,
            batch_export_id,
            data_interval_start,
            data_interval_end,
            workflow_id: Some(workflow_id.into()),
            workflow_run_id: Some(workflow_run_id.into()),
            status: RunStatus::Starting,
            created_at: now,
            last_updated_at: now,
        }
    }

    /// A run created ahead of a backfill execution; workflow ids stay unset
    pub fn for_backfill(
        team_id: i64,
        batch_export_id: BatchExportId,
        data_interval_start: Option<DateTime<Utc>>,
        data_interval_end: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RunId::new(),
            team_id,
            batch_export_id,
            data_interval_start,
            data_interval_end,
            workflow_id: None,
            workflow_run_id: None,
            status: RunStatus::Starting,
            created_at: now,
            last_updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
