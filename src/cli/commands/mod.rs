//! CLI command implementations
//!
//! Every command returns a process exit code:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 2 | Configuration error |
//! | 3 | Local state and schedule out of sync |
//! | 4 | Store or engine unreachable |
//! | 5 | Any other failure |

pub mod backfill;
pub mod execute;
pub mod runs;
pub mod schedule;
pub mod validate;

use crate::config::load_config;
use crate::core::service::BatchExportService;
use crate::domain::{BatchExportError, EngineError};

pub const EXIT_OK: i32 = 0;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_PARTIAL_SYNC: i32 = 3;
pub const EXIT_CONNECTION: i32 = 4;
pub const EXIT_FATAL: i32 = 5;

/// Exit code for a failed operation
pub fn exit_code(error: &BatchExportError) -> i32 {
    match error {
        BatchExportError::Configuration(_) => EXIT_CONFIG,
        BatchExportError::PartialSyncFailure { .. } => EXIT_PARTIAL_SYNC,
        BatchExportError::Database(_)
        | BatchExportError::Engine(EngineError::ConnectionFailed(_))
        | BatchExportError::Engine(EngineError::Timeout(_)) => EXIT_CONNECTION,
        _ => EXIT_FATAL,
    }
}

/// Print a failed operation and return its exit code
pub(crate) fn report_failure(action: &str, error: &BatchExportError) -> i32 {
    tracing::error!(error = %error, action, "Command failed");
    println!("❌ {action}");
    println!("   Error: {error}");
    if let BatchExportError::PartialSyncFailure { paused, .. } = error {
        println!(
            "   The export is stored with paused={paused}; rerun the command to sync its schedule"
        );
    }
    exit_code(error)
}

/// Load the configuration and connect the service
///
/// On failure the error is printed and the exit code returned instead.
pub(crate) fn connect(config_path: &str) -> Result<BatchExportService, i32> {
    let config = load_config(config_path).map_err(|e| {
        println!("❌ Failed to load configuration file");
        println!("   Error: {e}");
        EXIT_CONFIG
    })?;

    BatchExportService::connect(&config).map_err(|e| {
        println!("❌ Failed to connect");
        println!("   Error: {e}");
        match exit_code(&e) {
            EXIT_FATAL => EXIT_CONNECTION,
            code => code,
        }
    })
}
