//! Schedule commands: create, pause, unpause, delete, describe

use super::{connect, report_failure, EXIT_CONFIG, EXIT_OK};
use crate::domain::{BatchExport, BatchExportId};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the create command
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// JSON file with the export definition
    #[arg(short, long)]
    pub file: PathBuf,
}

impl CreateArgs {
    /// Store a new definition and register its schedule
    ///
    /// An id that is already stored is refused.
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let definition = match std::fs::read_to_string(&self.file) {
            Ok(d) => d,
            Err(e) => {
                println!("❌ Failed to read {}", self.file.display());
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };
        let export: BatchExport = match serde_json::from_str(&definition) {
            Ok(e) => e,
            Err(e) => {
                println!("❌ Invalid export definition in {}", self.file.display());
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let service = match connect(config_path) {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        if let Err(e) = service.register_batch_export(&export) {
            return Ok(report_failure("Failed to create BatchExport", &e));
        }

        println!("✅ BatchExport {} created", export.id);
        println!("   Name: {}", export.name);
        println!("   Destination: {}", export.destination.destination_type);
        println!("   Interval: {}", export.interval);
        println!("   Paused: {}", export.paused);
        Ok(EXIT_OK)
    }
}

/// Arguments for the pause and unpause commands
#[derive(Args, Debug)]
pub struct PauseArgs {
    /// BatchExport id
    pub id: BatchExportId,

    /// Note recorded on the schedule
    #[arg(long)]
    pub note: Option<String>,
}

impl PauseArgs {
    pub fn execute(&self, config_path: &str, paused: bool) -> anyhow::Result<i32> {
        let service = match connect(config_path) {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        let result = if paused {
            service.pause_batch_export(&self.id, self.note.as_deref())
        } else {
            service.unpause_batch_export(&self.id, self.note.as_deref())
        };
        let action = if paused { "paused" } else { "unpaused" };

        match result {
            Ok(()) => {
                println!("✅ BatchExport {} {action}", self.id);
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure(
                &format!("BatchExport {} could not be {action}", self.id),
                &e,
            )),
        }
    }
}

/// Arguments for the delete and describe commands
#[derive(Args, Debug)]
pub struct ScheduleIdArgs {
    /// BatchExport id
    pub id: BatchExportId,
}

impl ScheduleIdArgs {
    pub fn execute_delete(&self, config_path: &str) -> anyhow::Result<i32> {
        let service = match connect(config_path) {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        match service.delete_batch_export(&self.id) {
            Ok(()) => {
                println!("✅ BatchExport {} deleted", self.id);
                println!("   Running executions are left to finish");
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("Failed to delete BatchExport", &e)),
        }
    }

    pub fn execute_describe(&self, config_path: &str) -> anyhow::Result<i32> {
        let service = match connect(config_path) {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        let description = match service.describe_schedule(&self.id) {
            Ok(d) => d,
            Err(e) => return Ok(report_failure("Failed to describe schedule", &e)),
        };

        println!("📅 Schedule {}", description.schedule_id);
        println!("   Paused: {}", description.paused);
        if let Some(note) = &description.note {
            println!("   Note: {note}");
        }

        if description.next_action_times.is_empty() {
            println!("   Next runs: none");
        } else {
            println!("   Next runs:");
            for at in &description.next_action_times {
                println!("     {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
            }
        }

        if !description.recent_actions.is_empty() {
            println!("   Recent runs:");
            for action in &description.recent_actions {
                let scheduled = action
                    .schedule_time
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "     {:<25} {}",
                    scheduled,
                    action.workflow_id.as_deref().unwrap_or("-")
                );
            }
        }
        Ok(EXIT_OK)
    }
}
