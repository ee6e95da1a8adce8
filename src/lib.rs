// batch-exports - Batch export scheduling and run tracking
// Copyright (c) 2025 batch-exports Contributors
// Licensed under the MIT License

//! # batch-exports
//!
//! Coordination layer for recurring and one-off data exports. Export
//! definitions are registered as recurring schedules in Temporal, every
//! execution is tracked as a run record in PostgreSQL, and exports can be
//! paused, resumed, deleted and backfilled.
//!
//! The data movement itself runs inside workflows executed by the engine and
//! is not part of this crate.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Destination registry, run tracking, schedules, backfills and
//!   the blocking service API
//! - [`adapters`] - PostgreSQL stores and the Temporal client
//! - [`domain`] - Export definitions, runs, ids and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use batch_exports::config::load_config;
//! use batch_exports::core::service::BatchExportService;
//! use batch_exports::domain::BatchExportId;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("batch-exports.toml")?;
//!     let service = BatchExportService::connect(&config)?;
//!
//!     let id: BatchExportId = "0f9f5e8c-5d55-4a5d-9f3e-2a1c6b1e9f10".parse()?;
//!     let run = service.backfill_export(&id, None, None)?;
//!
//!     println!("Backfill run {} is {}", run.id, run.status);
//!     Ok(())
//! }
//! ```
//!
//! ## Run lifecycle
//!
//! Runs move from `Starting` through `Running` to one of the terminal
//! statuses `Completed`, `Failed` or `Cancelled`. Run creation is idempotent
//! per workflow execution and terminal runs are never modified, so workflow
//! activities can be redelivered safely.
//!
//! ## Pausing
//!
//! Pause and unpause write the local flag first and then update the
//! schedule. When the second step fails the call returns
//! [`domain::BatchExportError::PartialSyncFailure`] and the flag stays as
//! written; repeating the call brings both sides back in line.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
