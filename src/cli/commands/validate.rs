//! Validate config command implementation

use super::{EXIT_CONFIG, EXIT_OK};
use crate::adapters::postgresql::client::safe_connection_string;
use crate::config::load_config;
use crate::core::destinations::DestinationRegistry;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Load and validate the configuration without connecting anywhere
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config already runs validate()
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Temporal: {}", config.temporal.base_url);
        println!("  Namespace: {}", config.temporal.namespace);
        println!("  Task Queue: {}", config.temporal.task_queue);
        println!(
            "  PostgreSQL: {}",
            safe_connection_string(config.postgresql.connection_string.expose_secret().as_ref())
        );
        println!(
            "  Destinations: {}",
            DestinationRegistry::with_defaults()
                .destination_types()
                .join(", ")
        );
        println!();
        Ok(EXIT_OK)
    }
}
