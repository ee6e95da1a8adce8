//! Execute-workflow command implementation

use super::{connect, report_failure, EXIT_OK};
use clap::Args;

/// Arguments for the execute-workflow command
#[derive(Args, Debug)]
pub struct ExecuteWorkflowArgs {
    /// Registered workflow name, e.g. `s3-export`
    pub workflow: String,

    /// Workflow inputs as `key=value` pairs
    pub inputs: Vec<String>,
}

impl ExecuteWorkflowArgs {
    /// Start one execution and print its ids without waiting for it
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let service = match connect(config_path) {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        match service.execute_workflow(&self.workflow, &self.inputs) {
            Ok(handle) => {
                println!("✅ Started {}", self.workflow);
                println!("   Workflow ID: {}", handle.workflow_id);
                println!("   Run ID: {}", handle.run_id);
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure(
                &format!("Failed to execute {}", self.workflow),
                &e,
            )),
        }
    }
}
