//! PostgreSQL row models
//!
//! Column lists and row conversions for the `batch_exports` and
//! `batch_export_runs` tables.

use crate::domain::ids::{BatchExportId, RunId};
use crate::domain::{
    BatchExport, BatchExportError, BatchExportRun, Destination, ExportInterval, Result, RunStatus,
    Team,
};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tokio_postgres::Row;
use uuid::Uuid;

/// Select list for a batch export joined with its team and destination
pub const BATCH_EXPORT_COLUMNS: &str = r#"
    e.id, e.name, e.export_interval, e.paused, e.created_at, e.last_updated_at,
    t.id AS team_id, t.name AS team_name,
    d.id AS destination_id, d.type AS destination_type, d.config AS destination_config
"#;

/// Select list for a run
pub const RUN_COLUMNS: &str = r#"
    id, team_id, batch_export_id, data_interval_start, data_interval_end,
    workflow_id, workflow_run_id, status, created_at, last_updated_at
"#;

fn column<'a, T>(row: &'a Row, name: &str) -> Result<T>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    row.try_get(name)
        .map_err(|e| BatchExportError::Database(format!("Failed to read column {name}: {e}")))
}

/// A `batch_exports` row joined with `teams` and `batch_export_destinations`
#[derive(Debug, Clone)]
pub struct PostgreSQLBatchExport {
    pub id: Uuid,
    pub name: String,
    pub export_interval: String,
    pub paused: bool,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    pub team_id: i64,
    pub team_name: String,
    pub destination_id: Uuid,
    pub destination_type: String,
    pub destination_config: Value,
}

impl PostgreSQLBatchExport {
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: column(row, "id")?,
            name: column(row, "name")?,
            export_interval: column(row, "export_interval")?,
            paused: column(row, "paused")?,
            created_at: column(row, "created_at")?,
            last_updated_at: column(row, "last_updated_at")?,
            team_id: column(row, "team_id")?,
            team_name: column(row, "team_name")?,
            destination_id: column(row, "destination_id")?,
            destination_type: column(row, "destination_type")?,
            destination_config: column(row, "destination_config")?,
        })
    }

    /// Convert to the domain type
    ///
    /// # Errors
    ///
    /// Returns [`BatchExportError::Database`] when a stored value is not
    /// representable, e.g. a destination config that is not a JSON object.
    pub fn to_domain(self) -> Result<BatchExport> {
        let interval: ExportInterval = self
            .export_interval
            .parse()
            .map_err(BatchExportError::Database)?;

        let config: Map<String, Value> = match self.destination_config {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(BatchExportError::Database(format!(
                    "Destination {} config is not a JSON object: {other}",
                    self.destination_id
                )))
            }
        };

        Ok(BatchExport {
            id: BatchExportId::from_uuid(self.id),
            team: Team {
                id: self.team_id,
                name: self.team_name,
            },
            name: self.name,
            destination: Destination {
                id: self.destination_id,
                destination_type: self.destination_type,
                config,
            },
            interval,
            paused: self.paused,
            created_at: self.created_at,
            last_updated_at: self.last_updated_at,
        })
    }
}

/// A `batch_export_runs` row
#[derive(Debug, Clone)]
pub struct PostgreSQLRun {
    pub id: Uuid,
    pub team_id: i64,
    pub batch_export_id: Uuid,
    pub data_interval_start: Option<DateTime<Utc>>,
    pub data_interval_end: Option<DateTime<Utc>>,
    pub workflow_id: Option<String>,
    pub workflow_run_id: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl PostgreSQLRun {
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: column(row, "id")?,
            team_id: column(row, "team_id")?,
            batch_export_id: column(row, "batch_export_id")?,
            data_interval_start: column(row, "data_interval_start")?,
            data_interval_end: column(row, "data_interval_end")?,
            workflow_id: column(row, "workflow_id")?,
            workflow_run_id: column(row, "workflow_run_id")?,
            status: column(row, "status")?,
            created_at: column(row, "created_at")?,
            last_updated_at: column(row, "last_updated_at")?,
        })
    }

    pub fn from_domain(run: &BatchExportRun) -> Self {
        Self {
            id: *run.id.as_uuid(),
            team_id: run.team_id,
            batch_export_id: *run.batch_export_id.as_uuid(),
            data_interval_start: run.data_interval_start,
            data_interval_end: run.data_interval_end,
            workflow_id: run.workflow_id.clone(),
            workflow_run_id: run.workflow_run_id.clone(),
            status: run.status.as_str().to_string(),
            created_at: run.created_at,
            last_updated_at: run.last_updated_at,
        }
    }

    pub fn to_domain(self) -> Result<BatchExportRun> {
        let status: RunStatus = self.status.parse().map_err(BatchExportError::Database)?;

        Ok(BatchExportRun {
            id: RunId::from_uuid(self.id),
            team_id: self.team_id,
            batch_export_id: BatchExportId::from_uuid(self.batch_export_id),
            data_interval_start: self.data_interval_start,
            data_interval_end: self.data_interval_end,
            workflow_id: self.workflow_id,
            workflow_run_id: self.workflow_run_id,
            status,
            created_at: self.created_at,
            last_updated_at: self.last_updated_at,
        })
    }
}

/// Persisted names of the terminal statuses, bound as a `TEXT[]` parameter
pub fn terminal_status_names() -> Vec<String> {
    RunStatus::TERMINAL
        .iter()
        .map(|s| s.as_str().to_string())
        .collect()
}
