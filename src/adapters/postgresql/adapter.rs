//! PostgreSQL adapter implementing the storage traits

use crate::adapters::database::traits::{BatchExportStore, RunStatusUpdate, RunStore};
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::{
    terminal_status_names, PostgreSQLBatchExport, PostgreSQLRun, BATCH_EXPORT_COLUMNS,
    RUN_COLUMNS,
};
use crate::domain::ids::{BatchExportId, RunId};
use crate::domain::{BatchExport, BatchExportError, BatchExportRun, Result, RunStatus};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// PostgreSQL implementation of [`BatchExportStore`] and [`RunStore`]
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn new_with_arc(client: Arc<PostgreSQLClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }

    async fn select_run(
        &self,
        where_clause: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<BatchExportRun>> {
        let query = format!("SELECT {RUN_COLUMNS} FROM batch_export_runs WHERE {where_clause}");
        match self.client.query_opt(&query, params).await? {
            Some(row) => Ok(Some(PostgreSQLRun::from_row(&row)?.to_domain()?)),
            None => Ok(None),
        }
    }
}

fn db_error(context: &str, e: tokio_postgres::Error) -> BatchExportError {
    BatchExportError::Database(format!("{context}: {e}"))
}

#[async_trait]
impl BatchExportStore for PostgreSQLAdapter {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn get_batch_export(&self, id: &BatchExportId) -> Result<Option<BatchExport>> {
        let query = format!(
            "SELECT {BATCH_EXPORT_COLUMNS}
             FROM batch_exports e
             JOIN teams t ON t.id = e.team_id
             JOIN batch_export_destinations d ON d.id = e.destination_id
             WHERE e.id = $1"
        );

        match self.client.query_opt(&query, &[id.as_uuid()]).await? {
            Some(row) => Ok(Some(PostgreSQLBatchExport::from_row(&row)?.to_domain()?)),
            None => Ok(None),
        }
    }

    async fn upsert_batch_export(&self, export: &BatchExport) -> Result<()> {
        let mut conn = self.client.get_connection().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        tx.execute(
            "INSERT INTO teams (id, name) VALUES ($1, $2)
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
            &[&export.team.id, &export.team.name],
        )
        .await
        .map_err(|e| db_error("Failed to upsert team", e))?;

        let config = Value::Object(export.destination.config.clone());
        tx.execute(
            "INSERT INTO batch_export_destinations (id, type, config, created_at, last_updated_at)
             VALUES ($1, $2, $3, NOW(), NOW())
             ON CONFLICT (id) DO UPDATE SET
                type = EXCLUDED.type,
                config = EXCLUDED.config,
                last_updated_at = NOW()",
            &[
                &export.destination.id,
                &export.destination.destination_type,
                &config,
            ],
        )
        .await
        .map_err(|e| db_error("Failed to upsert destination", e))?;

        tx.execute(
            "INSERT INTO batch_exports (
                id, team_id, name, destination_id, export_interval, paused,
                created_at, last_updated_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (id) DO UPDATE SET
                team_id = EXCLUDED.team_id,
                name = EXCLUDED.name,
                destination_id = EXCLUDED.destination_id,
                export_interval = EXCLUDED.export_interval,
                paused = EXCLUDED.paused,
                last_updated_at = EXCLUDED.last_updated_at",
            &[
                export.id.as_uuid(),
                &export.team.id,
                &export.name,
                &export.destination.id,
                &export.interval.as_str(),
                &export.paused,
                &export.created_at,
                &export.last_updated_at,
            ],
        )
        .await
        .map_err(|e| db_error("Failed to upsert batch export", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;

        tracing::debug!(batch_export_id = %export.id, "BatchExport saved");
        Ok(())
    }

    async fn delete_batch_export(&self, id: &BatchExportId) -> Result<bool> {
        let deleted = self
            .client
            .execute("DELETE FROM batch_exports WHERE id = $1", &[id.as_uuid()])
            .await?;
        Ok(deleted > 0)
    }

    async fn set_paused(&self, id: &BatchExportId, paused: bool) -> Result<u64> {
        self.client
            .execute(
                "UPDATE batch_exports SET paused = $2, last_updated_at = NOW() WHERE id = $1",
                &[id.as_uuid(), &paused],
            )
            .await
    }
}

#[async_trait]
impl RunStore for PostgreSQLAdapter {
    async fn insert_run(&self, run: &BatchExportRun) -> Result<()> {
        let row = PostgreSQLRun::from_domain(run);
        let statement = format!(
            "INSERT INTO batch_export_runs ({RUN_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
        );

        self.client
            .execute(
                &statement,
                &[
                    &row.id,
                    &row.team_id,
                    &row.batch_export_id,
                    &row.data_interval_start,
                    &row.data_interval_end,
                    &row.workflow_id,
                    &row.workflow_run_id,
                    &row.status,
                    &row.created_at,
                    &row.last_updated_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn insert_run_for_execution(&self, run: &BatchExportRun) -> Result<BatchExportRun> {
        let (Some(workflow_id), Some(workflow_run_id)) = (&run.workflow_id, &run.workflow_run_id)
        else {
            return Err(BatchExportError::Validation(format!(
                "BatchExportRun {} has no workflow execution ids",
                run.id
            )));
        };

        let row = PostgreSQLRun::from_domain(run);
        let statement = format!(
            "INSERT INTO batch_export_runs ({RUN_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             ON CONFLICT ON CONSTRAINT batch_export_runs_workflow_execution_key DO NOTHING"
        );

        let inserted = self
            .client
            .execute(
                &statement,
                &[
                    &row.id,
                    &row.team_id,
                    &row.batch_export_id,
                    &row.data_interval_start,
                    &row.data_interval_end,
                    &row.workflow_id,
                    &row.workflow_run_id,
                    &row.status,
                    &row.created_at,
                    &row.last_updated_at,
                ],
            )
            .await?;

        if inserted == 1 {
            return Ok(run.clone());
        }

        self.select_run(
            "workflow_id = $1 AND workflow_run_id = $2",
            &[workflow_id, workflow_run_id],
        )
        .await?
        .ok_or_else(|| {
            BatchExportError::Database(format!(
                "BatchExportRun for workflow {workflow_id}/{workflow_run_id} conflicted but could not be read back"
            ))
        })
    }

    async fn attach_execution(
        &self,
        id: &RunId,
        batch_export_id: &BatchExportId,
        workflow_id: &str,
        workflow_run_id: &str,
    ) -> Result<Option<BatchExportRun>> {
        let statement = format!(
            "UPDATE batch_export_runs
             SET workflow_id = $3, workflow_run_id = $4, last_updated_at = NOW()
             WHERE id = $1 AND batch_export_id = $2 AND workflow_id IS NULL
             RETURNING {RUN_COLUMNS}"
        );

        match self
            .client
            .query_opt(
                &statement,
                &[
                    id.as_uuid(),
                    batch_export_id.as_uuid(),
                    &workflow_id,
                    &workflow_run_id,
                ],
            )
            .await?
        {
            Some(row) => Ok(Some(PostgreSQLRun::from_row(&row)?.to_domain()?)),
            None => Ok(None),
        }
    }

    async fn update_run_status(&self, id: &RunId, status: RunStatus) -> Result<RunStatusUpdate> {
        let terminal = terminal_status_names();

        let updated = self
            .client
            .execute(
                "UPDATE batch_export_runs
                 SET status = $2, last_updated_at = NOW()
                 WHERE id = $1 AND NOT (status = ANY($3))",
                &[id.as_uuid(), &status.as_str(), &terminal],
            )
            .await?;

        if updated > 0 {
            return Ok(RunStatusUpdate::Updated);
        }

        let current = self
            .client
            .query_opt(
                "SELECT status FROM batch_export_runs WHERE id = $1",
                &[id.as_uuid()],
            )
            .await?;

        match current {
            None => Ok(RunStatusUpdate::NotFound),
            Some(row) => {
                let raw: String = row
                    .try_get("status")
                    .map_err(|e| db_error("Failed to read run status", e))?;
                let current: RunStatus = raw.parse().map_err(BatchExportError::Database)?;
                Ok(RunStatusUpdate::AlreadyTerminal(current))
            }
        }
    }

    async fn get_run(&self, id: &RunId) -> Result<Option<BatchExportRun>> {
        self.select_run("id = $1", &[id.as_uuid()]).await
    }

    async fn list_runs(
        &self,
        batch_export_id: &BatchExportId,
        limit: usize,
    ) -> Result<Vec<BatchExportRun>> {
        let query = format!(
            "SELECT {RUN_COLUMNS} FROM batch_export_runs
             WHERE batch_export_id = $1
             ORDER BY created_at DESC
             LIMIT $2"
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        self.client
            .query(&query, &[batch_export_id.as_uuid(), &limit])
            .await?
            .iter()
            .map(|row| PostgreSQLRun::from_row(row)?.to_domain())
            .collect()
    }
}
