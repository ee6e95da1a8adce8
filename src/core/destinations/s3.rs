//! S3 destination workflow

use crate::config::SecretString;
use crate::core::destinations::workflow::{invalid_inputs, parse_key_values, BatchExportWorkflow};
use crate::domain::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Workflow that writes a batch window of events to an S3 bucket
pub struct S3BatchExportWorkflow;

/// Inputs of the `s3-export` workflow
///
/// `batch_window_size` is in seconds, e.g. 3600 for hourly batches.
/// `data_interval_start`/`data_interval_end` are only set for backfills and
/// manual runs; scheduled ticks derive their window from the schedule time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3BatchExportInputs {
    pub bucket_name: String,
    pub region: String,
    pub key_template: String,
    pub batch_window_size: u64,
    pub team_id: i64,
    pub batch_export_id: String,

    #[serde(default = "default_table_name")]
    pub table_name: String,

    /// Any output format the analytics store supports
    #[serde(default = "default_file_format")]
    pub file_format: String,

    #[serde(default)]
    pub partition_key: Option<String>,

    #[serde(default)]
    pub aws_access_key_id: Option<String>,

    #[serde(default)]
    pub aws_secret_access_key: Option<SecretString>,

    #[serde(default)]
    pub data_interval_start: Option<String>,

    #[serde(default)]
    pub data_interval_end: Option<String>,
}

fn default_table_name() -> String {
    "events".to_string()
}

fn default_file_format() -> String {
    "CSVWithNames".to_string()
}

/// Keys whose command-line values are integers
const NUMERIC_KEYS: [&str; 2] = ["team_id", "batch_window_size"];

impl BatchExportWorkflow for S3BatchExportWorkflow {
    type Inputs = S3BatchExportInputs;

    fn name() -> &'static str {
        "s3-export"
    }

    fn validate_inputs(inputs: &S3BatchExportInputs) -> Result<()> {
        if inputs.bucket_name.trim().is_empty() {
            return Err(invalid_inputs::<Self, _>("bucket_name cannot be empty"));
        }
        if inputs.region.trim().is_empty() {
            return Err(invalid_inputs::<Self, _>("region cannot be empty"));
        }
        if inputs.batch_window_size == 0 {
            return Err(invalid_inputs::<Self, _>("batch_window_size must be > 0"));
        }
        if inputs.aws_access_key_id.is_some() != inputs.aws_secret_access_key.is_some() {
            return Err(invalid_inputs::<Self, _>(
                "aws_access_key_id and aws_secret_access_key must be set together",
            ));
        }
        Ok(())
    }

    fn parse_inputs(args: &[String]) -> Result<S3BatchExportInputs> {
        let mut fields = parse_key_values(args)?;

        for key in NUMERIC_KEYS {
            if let Some(Value::String(raw)) = fields.get(key) {
                let number: i64 = raw.trim().parse().map_err(|_| {
                    invalid_inputs::<Self, _>(format!("{key} must be an integer, got '{raw}'"))
                })?;
                fields.insert(key.to_string(), Value::from(number));
            }
        }

        serde_json::from_value(Value::Object(fields)).map_err(invalid_inputs::<Self, _>)
    }
}
