//! Logging and observability
//!
//! Structured logging through `tracing`, plus a few macros that keep the field
//! names of recurring events consistent across modules.
//!
//! # Example
//!
//! ```no_run
//! use batch_exports::logging::init_logging;
//! use batch_exports::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(batch_export_id = "0f9f5e8c", "Schedule created");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log a schedule operation against the workflow engine
///
/// ```no_run
/// use batch_exports::log_schedule_action;
///
/// log_schedule_action!("pause", "0f9f5e8c-5d55-4a5d-9f3e-2a1c6b1e9f10");
/// ```
#[macro_export]
macro_rules! log_schedule_action {
    ($action:expr, $schedule_id:expr) => {
        tracing::info!(
            action = $action,
            schedule_id = %$schedule_id,
            "Schedule action applied"
        );
    };
}

/// Log a run status transition
#[macro_export]
macro_rules! log_run_transition {
    ($run_id:expr, $status:expr) => {
        tracing::info!(
            run_id = %$run_id,
            status = %$status,
            "BatchExportRun status updated"
        );
    };
}

/// Log an error with context
///
/// ```no_run
/// use batch_exports::log_error_with_context;
/// use batch_exports::domain::BatchExportError;
///
/// let error = BatchExportError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying operation"
        );
    };
}
