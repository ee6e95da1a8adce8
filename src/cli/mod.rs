//! CLI interface and argument parsing

pub mod commands;

use clap::{Parser, Subcommand};

/// batch-exports - schedule and backfill administration
#[derive(Parser, Debug)]
#[command(name = "batch-exports")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "batch-exports.toml",
        env = "BATCH_EXPORTS_CONFIG"
    )]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "BATCH_EXPORTS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store an export definition and register its schedule
    Create(commands::schedule::CreateArgs),

    /// Pause an export and its schedule
    Pause(commands::schedule::PauseArgs),

    /// Unpause an export and its schedule
    Unpause(commands::schedule::PauseArgs),

    /// Delete an export's schedule and definition
    Delete(commands::schedule::ScheduleIdArgs),

    /// Show the state of an export's schedule
    Describe(commands::schedule::ScheduleIdArgs),

    /// Export a historical interval with a one-off execution
    Backfill(commands::backfill::BackfillArgs),

    /// List the most recent runs of an export
    Runs(commands::runs::RunsArgs),

    /// Start a registered workflow with key=value inputs
    ExecuteWorkflow(commands::execute::ExecuteWorkflowArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}

impl Cli {
    /// Run the selected command and return the process exit code
    pub fn execute(&self) -> anyhow::Result<i32> {
        let config = self.config.as_str();
        match &self.command {
            Commands::Create(args) => args.execute(config),
            Commands::Pause(args) => args.execute(config, true),
            Commands::Unpause(args) => args.execute(config, false),
            Commands::Delete(args) => args.execute_delete(config),
            Commands::Describe(args) => args.execute_describe(config),
            Commands::Backfill(args) => args.execute(config),
            Commands::Runs(args) => args.execute(config),
            Commands::ExecuteWorkflow(args) => args.execute(config),
            Commands::ValidateConfig(args) => args.execute(config),
        }
    }
}
