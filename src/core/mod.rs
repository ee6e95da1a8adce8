//! Core batch export logic
//!
//! # Modules
//!
//! - [`destinations`] - Destination type to workflow registry
//! - [`runs`] - Run lifecycle tracking and workflow activity entry points
//! - [`schedules`] - Schedule creation, pause/unpause saga, delete, describe
//! - [`backfill`] - One-off executions over historical intervals
//! - [`service`] - Blocking API over all of the above
//!
//! # Example
//!
//! ```rust,no_run
//! use batch_exports::config::load_config;
//! use batch_exports::core::service::BatchExportService;
//! use batch_exports::domain::BatchExportId;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("batch-exports.toml")?;
//! let service = BatchExportService::connect(&config)?;
//!
//! let id: BatchExportId = "0f9f5e8c-5d55-4a5d-9f3e-2a1c6b1e9f10".parse()?;
//! service.pause_batch_export(&id, Some("Maintenance window"))?;
//!
//! for run in service.list_runs(&id, 10)? {
//!     println!("{} {}", run.id, run.status);
//! }
//! # Ok(())
//! # }
//! ```

pub mod backfill;
pub mod destinations;
pub mod runs;
pub mod schedules;
pub mod service;
