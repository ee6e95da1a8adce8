//! Configuration management.
//!
//! TOML configuration with `${VAR_NAME}` substitution, `BATCH_EXPORTS_*`
//! environment overrides and validation on load.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use batch_exports::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("batch-exports.toml")?;
//! println!("Temporal: {} ({})", config.temporal.base_url, config.temporal.namespace);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level
//! - [`TemporalConfig`] - workflow engine endpoint, namespace, task queue, retries
//! - [`PostgreSQLConfig`] - relational store holding exports and runs
//! - [`LoggingConfig`] - rolling JSON file logs
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//!
//! [application]
//! log_level = "info"
//!
//! [temporal]
//! base_url = "https://temporal.example.com:7243"
//! namespace = "batch-exports"
//! task_queue = "batch-exports-task-queue"
//! api_key = "${BATCH_EXPORTS_TEMPORAL_KEY}"
//!
//! [postgresql]
//! connection_string = "postgresql://exports:${PG_PASSWORD}@db:5432/exports"
//! max_connections = 10
//!
//! [logging]
//! local_enabled = true
//! local_path = "/var/log/batch-exports"
//! local_rotation = "daily"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_str};
pub use schema::{
    ApplicationConfig, BatchExportsConfig, Environment, LoggingConfig, PostgreSQLConfig,
    RetryConfig, TemporalConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
