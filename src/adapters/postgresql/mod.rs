//! PostgreSQL store for export definitions and run records

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
pub use models::{PostgreSQLBatchExport, PostgreSQLRun};
