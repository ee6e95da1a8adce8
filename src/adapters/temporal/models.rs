//! Workflow engine request and response types
//!
//! These are the engine-facing shapes the core builds; the client translates
//! them to and from the engine's HTTP JSON encoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Indexed attributes used to filter workflows in the engine's visibility store
///
/// Each key maps to a list of values, e.g. `"TeamId" -> [2]`.
pub type SearchAttributes = BTreeMap<String, Vec<Value>>;

/// The workflow a schedule starts on each tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleActionStartWorkflow {
    pub workflow_type: String,
    pub workflow_id: String,
    pub task_queue: String,

    /// Single JSON argument passed to the workflow
    pub input: Value,

    pub search_attributes: SearchAttributes,
}

/// When a schedule fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScheduleSpec {
    /// Fixed intervals in seconds
    pub intervals: Vec<u64>,
}

impl ScheduleSpec {
    pub fn every(seconds: u64) -> Self {
        Self {
            intervals: vec![seconds],
        }
    }
}

/// Initial state of a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScheduleState {
    pub note: Option<String>,
    pub paused: bool,
}

/// A schedule registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateScheduleRequest {
    pub schedule_id: String,
    pub action: ScheduleActionStartWorkflow,
    pub spec: ScheduleSpec,
    pub state: ScheduleState,
    pub search_attributes: SearchAttributes,

    /// Reused on retries so the engine deduplicates a create that already
    /// went through
    pub request_id: String,
}

/// A direct, unscheduled workflow execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartWorkflowRequest {
    pub workflow_type: String,
    pub workflow_id: String,
    pub task_queue: String,
    pub input: Value,
    pub search_attributes: SearchAttributes,
    pub request_id: String,
}

impl StartWorkflowRequest {
    pub fn new(
        workflow_type: impl Into<String>,
        workflow_id: impl Into<String>,
        task_queue: impl Into<String>,
        input: Value,
    ) -> Self {
        Self {
            workflow_type: workflow_type.into(),
            workflow_id: workflow_id.into(),
            task_queue: task_queue.into(),
            input,
            search_attributes: SearchAttributes::new(),
            request_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_search_attributes(mut self, search_attributes: SearchAttributes) -> Self {
        self.search_attributes = search_attributes;
        self
    }
}

/// Identifies a started workflow execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowHandle {
    pub workflow_id: String,
    pub run_id: String,
}

/// One past action of a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScheduleActionResult {
    pub schedule_time: Option<DateTime<Utc>>,
    pub actual_time: Option<DateTime<Utc>>,
    pub workflow_id: Option<String>,
    pub run_id: Option<String>,
}

/// Current state of a schedule as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDescription {
    pub schedule_id: String,
    pub paused: bool,
    pub note: Option<String>,
    pub next_action_times: Vec<DateTime<Utc>>,
    pub recent_actions: Vec<ScheduleActionResult>,
}

fn duration_string(seconds: u64) -> String {
    format!("{seconds}s")
}

fn indexed_fields(attributes: &SearchAttributes) -> Value {
    json!({ "indexedFields": attributes })
}

impl CreateScheduleRequest {
    /// Body of `POST /namespaces/{ns}/schedules/{id}`
    pub fn to_wire(&self) -> Value {
        let intervals: Vec<Value> = self
            .spec
            .intervals
            .iter()
            .map(|s| json!({ "interval": duration_string(*s) }))
            .collect();

        json!({
            "schedule": {
                "spec": { "interval": intervals },
                "action": {
                    "startWorkflow": {
                        "workflowId": self.action.workflow_id,
                        "workflowType": { "name": self.action.workflow_type },
                        "taskQueue": { "name": self.action.task_queue },
                        "input": [self.action.input],
                        "searchAttributes": indexed_fields(&self.action.search_attributes),
                    }
                },
                "state": {
                    "notes": self.state.note.clone().unwrap_or_default(),
                    "paused": self.state.paused,
                },
            },
            "searchAttributes": indexed_fields(&self.search_attributes),
            "requestId": self.request_id,
        })
    }
}

impl StartWorkflowRequest {
    /// Body of `POST /namespaces/{ns}/workflows/{id}`
    pub fn to_wire(&self) -> Value {
        json!({
            "workflowId": self.workflow_id,
            "workflowType": { "name": self.workflow_type },
            "taskQueue": { "name": self.task_queue },
            "input": [self.input],
            "searchAttributes": indexed_fields(&self.search_attributes),
            "requestId": self.request_id,
        })
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct WireDescribeScheduleResponse {
    schedule: WireSchedule,
    info: WireScheduleInfo,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct WireSchedule {
    state: WireScheduleState,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct WireScheduleState {
    notes: Option<String>,
    paused: bool,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct WireScheduleInfo {
    future_action_times: Vec<DateTime<Utc>>,
    recent_actions: Vec<WireScheduleActionResult>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct WireScheduleActionResult {
    schedule_time: Option<DateTime<Utc>>,
    actual_time: Option<DateTime<Utc>>,
    start_workflow_result: Option<WireWorkflowExecution>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct WireWorkflowExecution {
    workflow_id: Option<String>,
    run_id: Option<String>,
}

impl WireDescribeScheduleResponse {
    pub(crate) fn into_description(self, schedule_id: &str) -> ScheduleDescription {
        ScheduleDescription {
            schedule_id: schedule_id.to_string(),
            paused: self.schedule.state.paused,
            note: self.schedule.state.notes.filter(|n| !n.is_empty()),
            next_action_times: self.info.future_action_times,
            recent_actions: self
                .info
                .recent_actions
                .into_iter()
                .map(|action| {
                    let execution = action.start_workflow_result.unwrap_or_default();
                    ScheduleActionResult {
                        schedule_time: action.schedule_time,
                        actual_time: action.actual_time,
                        workflow_id: execution.workflow_id,
                        run_id: execution.run_id,
                    }
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireStartWorkflowResponse {
    pub run_id: String,
}
