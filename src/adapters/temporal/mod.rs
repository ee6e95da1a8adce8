//! Durable workflow engine integration
//!
//! [`WorkflowEngine`] is the port the core depends on; [`TemporalClient`]
//! implements it over Temporal's HTTP API.

pub mod client;
pub mod models;
pub mod traits;

pub use client::TemporalClient;
pub use models::{
    CreateScheduleRequest, ScheduleActionResult, ScheduleActionStartWorkflow,
    ScheduleDescription, ScheduleSpec, ScheduleState, SearchAttributes, StartWorkflowRequest,
    WorkflowHandle,
};
pub use traits::WorkflowEngine;
