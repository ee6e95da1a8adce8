//! Domain models and types.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`BatchExportId`], [`RunId`])
//! - **Export definitions** ([`BatchExport`], [`Destination`], [`Team`])
//! - **Run records** ([`BatchExportRun`], [`RunStatus`])
//! - **Error types** ([`BatchExportError`], [`EngineError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, BatchExportError>`]:
//!
//! ```rust
//! use batch_exports::domain::{BatchExportError, Result, RunStatus};
//!
//! fn parse_status(raw: &str) -> Result<RunStatus> {
//!     raw.parse().map_err(BatchExportError::Validation)
//! }
//! ```

pub mod batch_export;
pub mod errors;
pub mod ids;
pub mod result;
pub mod run;

pub use batch_export::{BatchExport, Destination, ExportInterval, Team};
pub use errors::{BatchExportError, EngineError};
pub use ids::{BatchExportId, RunId};
pub use result::Result;
pub use run::{BatchExportRun, RunStatus};
