//! Run lifecycle
//!
//! [`RunTracker`] owns every write to run records. The [`activities`]
//! functions are what workflow activities call with their raw payloads.

pub mod activities;
pub mod tracker;

pub use activities::{
    create_export_run, parse_timestamp, update_export_run_status, ActivityInfo,
    CreateBatchExportRunInputs, UpdateBatchExportRunStatusInputs,
};
pub use tracker::RunTracker;
