//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{BatchExportsConfig, Environment};
use super::secret::secret_string;
use crate::domain::errors::BatchExportError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Substitutes `${VAR}` placeholders from the environment
/// 3. Parses the TOML into [`BatchExportsConfig`]
/// 4. Applies `BATCH_EXPORTS_*` environment overrides
/// 5. Validates the result
///
/// # Errors
///
/// Returns [`BatchExportError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, parsing fails or validation
/// rejects a value.
///
/// # Examples
///
/// ```no_run
/// use batch_exports::config::loader::load_config;
///
/// let config = load_config("batch-exports.toml").expect("Failed to load config");
/// println!("{}", config.temporal.namespace);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<BatchExportsConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(BatchExportError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        BatchExportError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_str(&contents)
}

/// Same as [`load_config`] for configuration already in memory
pub fn load_config_str(contents: &str) -> Result<BatchExportsConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: BatchExportsConfig = toml::from_str(&contents)
        .map_err(|e| BatchExportError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        BatchExportError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| BatchExportError::Configuration(format!("Invalid placeholder regex: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(BatchExportError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        BatchExportError::Configuration(format!("Invalid value '{value}' for {name}"))
    })
}

/// Applies environment variable overrides using the `BATCH_EXPORTS_` prefix
///
/// Variables follow the pattern `BATCH_EXPORTS_<SECTION>_<KEY>`, for example
/// `BATCH_EXPORTS_TEMPORAL_NAMESPACE`.
fn apply_env_overrides(config: &mut BatchExportsConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok();

    if let Some(val) = var("BATCH_EXPORTS_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = var("BATCH_EXPORTS_ENVIRONMENT") {
        config.environment = match val.trim().to_lowercase().as_str() {
            "development" => Environment::Development,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            other => {
                return Err(BatchExportError::Configuration(format!(
                    "Invalid value '{other}' for BATCH_EXPORTS_ENVIRONMENT"
                )))
            }
        };
    }

    // Temporal
    if let Some(val) = var("BATCH_EXPORTS_TEMPORAL_BASE_URL") {
        config.temporal.base_url = val;
    }
    if let Some(val) = var("BATCH_EXPORTS_TEMPORAL_NAMESPACE") {
        config.temporal.namespace = val;
    }
    if let Some(val) = var("BATCH_EXPORTS_TEMPORAL_TASK_QUEUE") {
        config.temporal.task_queue = val;
    }
    if let Some(val) = var("BATCH_EXPORTS_TEMPORAL_API_KEY") {
        config.temporal.api_key = Some(secret_string(val));
    }
    if let Some(val) = var("BATCH_EXPORTS_TEMPORAL_TIMEOUT_SECONDS") {
        config.temporal.timeout_seconds =
            parse_override("BATCH_EXPORTS_TEMPORAL_TIMEOUT_SECONDS", &val)?;
    }
    if let Some(val) = var("BATCH_EXPORTS_TEMPORAL_TLS_VERIFY") {
        config.temporal.tls_verify = parse_override("BATCH_EXPORTS_TEMPORAL_TLS_VERIFY", &val)?;
    }
    if let Some(val) = var("BATCH_EXPORTS_TEMPORAL_MAX_RETRIES") {
        config.temporal.retry.max_retries =
            parse_override("BATCH_EXPORTS_TEMPORAL_MAX_RETRIES", &val)?;
    }

    // PostgreSQL
    if let Some(val) = var("BATCH_EXPORTS_POSTGRESQL_CONNECTION_STRING") {
        config.postgresql.connection_string = secret_string(val);
    }
    if let Some(val) = var("BATCH_EXPORTS_POSTGRESQL_MAX_CONNECTIONS") {
        config.postgresql.max_connections =
            parse_override("BATCH_EXPORTS_POSTGRESQL_MAX_CONNECTIONS", &val)?;
    }

    // Logging
    if let Some(val) = var("BATCH_EXPORTS_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("BATCH_EXPORTS_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = var("BATCH_EXPORTS_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = var("BATCH_EXPORTS_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
