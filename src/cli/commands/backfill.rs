//! Backfill command implementation

use super::{connect, report_failure, EXIT_CONFIG, EXIT_OK};
use crate::core::runs::parse_timestamp;
use crate::domain::BatchExportId;
use chrono::{DateTime, Utc};
use clap::Args;

/// Arguments for the backfill command
#[derive(Args, Debug)]
pub struct BackfillArgs {
    /// BatchExport id
    pub id: BatchExportId,

    /// Start of the interval (ISO-8601, UTC when no offset is given)
    #[arg(long)]
    pub start_at: Option<String>,

    /// End of the interval, exclusive
    #[arg(long)]
    pub end_at: Option<String>,
}

fn parse_bound(name: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>, String> {
    raw.map(parse_timestamp)
        .transpose()
        .map_err(|e| format!("--{name}: {e}"))
}

impl BackfillArgs {
    /// Create a run for the interval and start its execution
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let bounds = parse_bound("start-at", self.start_at.as_deref())
            .and_then(|start| Ok((start, parse_bound("end-at", self.end_at.as_deref())?)));
        let (start_at, end_at) = match bounds {
            Ok(b) => b,
            Err(e) => {
                println!("❌ Invalid backfill interval");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let service = match connect(config_path) {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        match service.backfill_export(&self.id, start_at, end_at) {
            Ok(run) => {
                println!("✅ Backfill started for BatchExport {}", self.id);
                println!("   Run: {}", run.id);
                println!(
                    "   Interval: {} to {}",
                    start_at.map_or("-".to_string(), |t| t.to_rfc3339()),
                    end_at.map_or("now".to_string(), |t| t.to_rfc3339())
                );
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("Failed to start backfill", &e)),
        }
    }
}
