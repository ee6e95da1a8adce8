//! Runs command implementation
//!
//! Lists the most recent runs of an export.

use super::{connect, report_failure, EXIT_OK};
use crate::domain::BatchExportId;
use clap::Args;

/// Arguments for the runs command
#[derive(Args, Debug)]
pub struct RunsArgs {
    /// BatchExport id
    pub id: BatchExportId,

    /// Maximum number of runs to show
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

impl RunsArgs {
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let service = match connect(config_path) {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        let runs = match service.list_runs(&self.id, self.limit) {
            Ok(r) => r,
            Err(e) => return Ok(report_failure("Failed to list runs", &e)),
        };

        if runs.is_empty() {
            println!("No runs found for BatchExport {}.", self.id);
            return Ok(EXIT_OK);
        }

        println!("Found {} run(s):", runs.len());
        println!();
        println!(
            "{:<38} {:<11} {:<21} {:<21} {:<21}",
            "Run ID", "Status", "Interval Start", "Interval End", "Created"
        );
        println!("{}", "-".repeat(115));

        let timestamp = |ts: Option<chrono::DateTime<chrono::Utc>>| {
            ts.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string())
        };

        for run in runs {
            println!(
                "{:<38} {:<11} {:<21} {:<21} {:<21}",
                run.id.to_string(),
                run.status.as_str(),
                timestamp(run.data_interval_start),
                timestamp(run.data_interval_end),
                timestamp(Some(run.created_at))
            );
        }

        println!();
        Ok(EXIT_OK)
    }
}
