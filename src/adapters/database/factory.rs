//! Store factory
//!
//! Builds both store ports from one PostgreSQL connection pool.

use crate::adapters::database::traits::{BatchExportStore, RunStore};
use crate::adapters::postgresql::adapter::PostgreSQLAdapter;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::config::schema::PostgreSQLConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Export definition store and run store sharing one pool
pub type Stores = (
    Arc<dyn BatchExportStore + Send + Sync>,
    Arc<dyn RunStore + Send + Sync>,
);

/// Create both stores from the same underlying client
///
/// Runs the schema migration before returning.
///
/// # Errors
///
/// Returns an error if the pool cannot be created or the migration fails.
pub async fn create_stores(config: &PostgreSQLConfig) -> Result<Stores> {
    tracing::info!("Creating PostgreSQL stores");
    let client = Arc::new(PostgreSQLClient::new(config.clone()).await?);
    client.ensure_database_exists().await?;

    let adapter = Arc::new(PostgreSQLAdapter::new_with_arc(client));

    Ok((
        adapter.clone() as Arc<dyn BatchExportStore + Send + Sync>,
        adapter as Arc<dyn RunStore + Send + Sync>,
    ))
}
