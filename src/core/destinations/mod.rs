//! Destination workflow registry
//!
//! Each destination type tag (e.g. `"S3"`) maps to the workflow type the
//! engine runs for it and to the constructor of that workflow's inputs.
//! New destinations are added by implementing [`BatchExportWorkflow`] and
//! calling [`DestinationRegistry::register`].

pub mod registry;
pub mod s3;
pub mod workflow;

pub use registry::DestinationRegistry;
pub use s3::{S3BatchExportInputs, S3BatchExportWorkflow};
pub use workflow::{
    format_timestamp, parse_key_values, BatchExportWorkflow, DestinationWorkflow, InputContext,
};
