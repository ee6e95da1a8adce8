//! Destination workflow types and input construction

use crate::domain::{BatchExport, BatchExportError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// A workflow type the engine can execute for a destination
///
/// Implementors are marker types; everything the registry needs is an
/// associated item, so no instance is ever created.
pub trait BatchExportWorkflow {
    /// Typed workflow arguments
    type Inputs: Serialize + DeserializeOwned;

    /// Workflow type name registered with the engine
    fn name() -> &'static str;

    /// Checks beyond what deserialization already enforces
    fn validate_inputs(_inputs: &Self::Inputs) -> Result<()> {
        Ok(())
    }

    /// Parse inputs from `key=value` command-line arguments
    fn parse_inputs(args: &[String]) -> Result<Self::Inputs>;
}

/// Per-execution fields merged into the destination config
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputContext {
    pub data_interval_start: Option<DateTime<Utc>>,
    pub data_interval_end: Option<DateTime<Utc>>,
}

impl InputContext {
    /// Context for scheduled ticks; the engine supplies the interval
    pub fn scheduled() -> Self {
        Self::default()
    }

    pub fn interval(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self {
            data_interval_start: start,
            data_interval_end: end,
        }
    }
}

/// Timestamp format used in workflow inputs
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// A type-erased registry entry
#[derive(Clone, Copy)]
pub struct DestinationWorkflow {
    name: &'static str,
    build: fn(Map<String, Value>) -> Result<Value>,
    parse: fn(&[String]) -> Result<Value>,
}

impl DestinationWorkflow {
    /// Registry entry for workflow type `W`
    pub fn of<W: BatchExportWorkflow>() -> Self {
        Self {
            name: W::name(),
            build: build_typed_inputs::<W>,
            parse: parse_typed_inputs::<W>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Build the workflow's JSON input for an export
    ///
    /// The destination config is merged with the export's context: `team_id`,
    /// `batch_export_id` and the interval bounds always override config keys;
    /// `batch_window_size` is taken from config when present and otherwise
    /// from the export interval.
    ///
    /// # Errors
    ///
    /// Returns [`BatchExportError::InvalidWorkflowInputs`] when the merged
    /// fields do not match the workflow's input type or fail validation.
    pub fn build_inputs(&self, export: &BatchExport, context: InputContext) -> Result<Value> {
        let mut fields = export.destination.config.clone();

        fields
            .entry("batch_window_size")
            .or_insert_with(|| Value::from(export.interval.as_seconds()));

        fields.insert("team_id".to_string(), Value::from(export.team.id));
        fields.insert(
            "batch_export_id".to_string(),
            Value::from(export.id.to_string()),
        );
        fields.insert(
            "data_interval_start".to_string(),
            context
                .data_interval_start
                .map_or(Value::Null, |ts| Value::from(format_timestamp(&ts))),
        );
        fields.insert(
            "data_interval_end".to_string(),
            context
                .data_interval_end
                .map_or(Value::Null, |ts| Value::from(format_timestamp(&ts))),
        );

        (self.build)(fields)
    }

    /// Parse command-line arguments into the workflow's JSON input
    pub fn parse_inputs(&self, args: &[String]) -> Result<Value> {
        (self.parse)(args)
    }
}

impl fmt::Debug for DestinationWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestinationWorkflow")
            .field("name", &self.name)
            .finish()
    }
}

/// [`BatchExportError::InvalidWorkflowInputs`] for workflow `W`
pub fn invalid_inputs<W: BatchExportWorkflow, E: fmt::Display>(message: E) -> BatchExportError {
    BatchExportError::InvalidWorkflowInputs {
        workflow: W::name().to_string(),
        message: message.to_string(),
    }
}

fn build_typed_inputs<W: BatchExportWorkflow>(fields: Map<String, Value>) -> Result<Value> {
    let inputs: W::Inputs =
        serde_json::from_value(Value::Object(fields)).map_err(invalid_inputs::<W, _>)?;
    W::validate_inputs(&inputs)?;
    Ok(serde_json::to_value(&inputs)?)
}

fn parse_typed_inputs<W: BatchExportWorkflow>(args: &[String]) -> Result<Value> {
    let inputs = W::parse_inputs(args)?;
    W::validate_inputs(&inputs)?;
    Ok(serde_json::to_value(&inputs)?)
}

/// Split `key=value` arguments into string fields
///
/// # Errors
///
/// Returns [`BatchExportError::Validation`] for an argument without `=` or
/// with an empty key.
pub fn parse_key_values(args: &[String]) -> Result<Map<String, Value>> {
    let mut fields = Map::new();
    for arg in args {
        let (key, value) = arg.split_once('=').ok_or_else(|| {
            BatchExportError::Validation(format!("Expected key=value argument, got '{arg}'"))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(BatchExportError::Validation(format!(
                "Empty key in argument '{arg}'"
            )));
        }
        fields.insert(key.to_string(), Value::from(value.to_string()));
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::BatchExportId;
    use crate::domain::{Destination, ExportInterval, Team};
    use chrono::TimeZone;
    use serde::Deserialize;
    use serde_json::json;
    use uuid::Uuid;

    #[derive(Debug, Serialize, Deserialize)]
    struct EchoInputs {
        team_id: i64,
        batch_export_id: String,
        batch_window_size: u64,
        target: String,
        data_interval_start: Option<String>,
        data_interval_end: Option<String>,
    }

    struct EchoWorkflow;

    impl BatchExportWorkflow for EchoWorkflow {
        type Inputs = EchoInputs;

        fn name() -> &'static str {
            "echo"
        }

        fn validate_inputs(inputs: &EchoInputs) -> Result<()> {
            if inputs.target.is_empty() {
                return Err(invalid_inputs::<Self, _>("target cannot be empty"));
            }
            Ok(())
        }

        fn parse_inputs(args: &[String]) -> Result<EchoInputs> {
            let fields = parse_key_values(args)?;
            serde_json::from_value(Value::Object(fields)).map_err(invalid_inputs::<Self, _>)
        }
    }

    fn export(config: Value) -> BatchExport {
        BatchExport {
            id: BatchExportId::new(),
            team: Team {
                id: 2,
                name: "Analytics".to_string(),
            },
            name: "echo".to_string(),
            destination: Destination {
                id: Uuid::new_v4(),
                destination_type: "Echo".to_string(),
                config: config.as_object().cloned().unwrap_or_default(),
            },
            interval: ExportInterval::Hour,
            paused: false,
            created_at: Utc::now(),
            last_updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_context_overrides_config() {
        let export = export(json!({"target": "x", "team_id": 999, "batch_export_id": "spoofed"}));
        let entry = DestinationWorkflow::of::<EchoWorkflow>();

        let inputs = entry
            .build_inputs(&export, InputContext::scheduled())
            .unwrap();
        assert_eq!(inputs["team_id"], 2);
        assert_eq!(inputs["batch_export_id"], export.id.to_string());
        assert_eq!(inputs["batch_window_size"], 3600);
        assert!(inputs["data_interval_end"].is_null());
    }

    #[test]
    fn test_config_window_size_wins_over_interval() {
        let export = export(json!({"target": "x", "batch_window_size": 60}));
        let inputs = DestinationWorkflow::of::<EchoWorkflow>()
            .build_inputs(&export, InputContext::scheduled())
            .unwrap();
        assert_eq!(inputs["batch_window_size"], 60);
    }

    #[test]
    fn test_interval_bounds_are_formatted() {
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
        let inputs = DestinationWorkflow::of::<EchoWorkflow>()
            .build_inputs(
                &export(json!({"target": "x"})),
                InputContext::interval(Some(start), Some(end)),
            )
            .unwrap();
        assert_eq!(inputs["data_interval_start"], "2023-01-01T00:00:00Z");
        assert_eq!(inputs["data_interval_end"], "2023-01-02T00:00:00Z");
    }

    #[test]
    fn test_schema_mismatch_is_invalid_inputs() {
        let err = DestinationWorkflow::of::<EchoWorkflow>()
            .build_inputs(&export(json!({})), InputContext::scheduled())
            .unwrap_err();
        assert!(
            matches!(err, BatchExportError::InvalidWorkflowInputs { ref workflow, .. } if workflow == "echo")
        );
    }

    #[test]
    fn test_validation_runs_after_deserialization() {
        let err = DestinationWorkflow::of::<EchoWorkflow>()
            .build_inputs(&export(json!({"target": ""})), InputContext::scheduled())
            .unwrap_err();
        assert!(err.to_string().contains("target cannot be empty"));
    }

    #[test]
    fn test_parse_key_values() {
        let args = vec!["bucket_name=exports".to_string(), "key=a=b".to_string()];
        let fields = parse_key_values(&args).unwrap();
        assert_eq!(fields["bucket_name"], "exports");
        assert_eq!(fields["key"], "a=b");

        assert!(parse_key_values(&["novalue".to_string()]).is_err());
        assert!(parse_key_values(&["=value".to_string()]).is_err());
    }
}
