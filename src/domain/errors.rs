//! Domain error types
//!
//! All errors are domain-specific and don't expose third-party types: adapter
//! failures are converted to strings or to [`EngineError`] at the boundary.

use thiserror::Error;

/// Main batch export error type
#[derive(Debug, Error)]
pub enum BatchExportError {
    /// The destination type tag has no registered workflow
    #[error("Unknown destination type: {0}")]
    UnknownDestinationType(String),

    /// The workflow engine already has a schedule with this id
    #[error("Schedule already exists: {0}")]
    ScheduleAlreadyExists(String),

    /// The workflow engine has no schedule with this id
    #[error("Schedule not found: {0}")]
    ScheduleNotFound(String),

    /// A status update targeted a run that does not exist
    #[error("BatchExportRun with id {0} not found")]
    RunNotFound(String),

    /// No export definition with this id exists in the store
    #[error("BatchExport with id {0} not found")]
    BatchExportNotFound(String),

    /// The local paused flag was written but the schedule call failed
    ///
    /// The flag is not rolled back. Callers must reconcile, either by retrying
    /// the same operation or by manual intervention.
    #[error(
        "BatchExport {batch_export_id} marked paused={paused} locally but the schedule was not updated: {source}"
    )]
    PartialSyncFailure {
        batch_export_id: String,
        paused: bool,
        #[source]
        source: Box<BatchExportError>,
    },

    /// Destination configuration does not satisfy the workflow's input schema
    #[error("Invalid inputs for workflow {workflow}: {message}")]
    InvalidWorkflowInputs { workflow: String, message: String },

    /// Workflow engine errors
    #[error("Workflow engine error: {0}")]
    Engine(#[from] EngineError),

    /// Relational store errors
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl BatchExportError {
    /// Whether retrying the same call may succeed without any other change
    pub fn is_retryable(&self) -> bool {
        match self {
            BatchExportError::Engine(e) => e.is_retryable(),
            BatchExportError::PartialSyncFailure { .. } => true,
            _ => false,
        }
    }
}

/// Workflow engine errors
///
/// Conflicts and missing schedules are reported as
/// [`BatchExportError::ScheduleAlreadyExists`] and
/// [`BatchExportError::ScheduleNotFound`]; everything else lands here.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Failed to reach the engine
    #[error("Failed to connect to workflow engine: {0}")]
    ConnectionFailed(String),

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Response body could not be understood
    #[error("Invalid response from workflow engine: {0}")]
    InvalidResponse(String),
}

impl EngineError {
    /// Transient failures the engine client retries with backoff
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::ConnectionFailed(_)
                | EngineError::Timeout(_)
                | EngineError::ServerError { .. }
        )
    }
}

impl From<std::io::Error> for BatchExportError {
    fn from(err: std::io::Error) -> Self {
        BatchExportError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BatchExportError {
    fn from(err: serde_json::Error) -> Self {
        BatchExportError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for BatchExportError {
    fn from(err: toml::de::Error) -> Self {
        BatchExportError::Configuration(format!("TOML parse error: {err}"))
    }
}
