//! Temporal HTTP API client
//!
//! Maps [`WorkflowEngine`] operations onto
//! `{base_url}/api/v1/namespaces/{namespace}/...`. Transient failures
//! (connection errors, timeouts, 5xx) are retried with exponential backoff.

use crate::adapters::temporal::models::{
    CreateScheduleRequest, ScheduleDescription, StartWorkflowRequest,
    WireDescribeScheduleResponse, WireStartWorkflowResponse, WorkflowHandle,
};
use crate::adapters::temporal::traits::WorkflowEngine;
use crate::config::TemporalConfig;
use crate::domain::{BatchExportError, EngineError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;
use uuid::Uuid;

const DEFAULT_PAUSE_NOTE: &str = "Paused by batch-exports";
const DEFAULT_UNPAUSE_NOTE: &str = "Unpaused by batch-exports";

/// Temporal client over the HTTP API
pub struct TemporalClient {
    base_url: Url,
    client: Client,
    config: TemporalConfig,
}

impl TemporalClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns [`BatchExportError::Configuration`] if the base URL is invalid
    /// or the HTTP client cannot be built.
    pub fn new(config: TemporalConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            BatchExportError::Configuration(format!(
                "Invalid temporal.base_url '{}': {e}",
                config.base_url
            ))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(BatchExportError::Configuration(format!(
                "temporal.base_url '{}' cannot be used as a base URL",
                config.base_url
            )));
        }

        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds));

        if !config.tls_verify {
            tracing::warn!("TLS certificate verification disabled for the workflow engine");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            BatchExportError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            base_url,
            client,
            config,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    /// Task queue workflows are dispatched to
    pub fn task_queue(&self) -> &str {
        &self.config.task_queue
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                BatchExportError::Configuration(format!(
                    "temporal.base_url '{}' cannot be used as a base URL",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["api", "v1", "namespaces", self.config.namespace.as_str()])
            .extend(segments);
        Ok(url)
    }

    fn schedule_endpoint(&self, schedule_id: &str) -> Result<Url> {
        self.endpoint(&["schedules", schedule_id])
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        }
    }

    /// Send a request, mapping transport failures to [`EngineError`]
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        self.authorize(request).send().await.map_err(|e| {
            if e.is_timeout() {
                EngineError::Timeout(e.to_string()).into()
            } else {
                EngineError::ConnectionFailed(e.to_string()).into()
            }
        })
    }

    /// Retry an operation with exponential backoff while its error is retryable
    ///
    /// The first attempt is followed by at most `retry.max_retries` retries.
    async fn retry_request<F, T, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let retry = &self.config.retry;
        let max_attempts = retry.max_retries + 1;
        let mut retries = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if retries >= retry.max_retries || !e.is_retryable() {
                        return Err(e);
                    }
                    retries += 1;

                    let delay_ms = (retry.initial_delay_ms as f64
                        * retry.backoff_multiplier.powi(retries as i32 - 1))
                        as u64;
                    let delay_ms = delay_ms.min(retry.max_delay_ms);

                    crate::log_retry_attempt!(retries + 1, max_attempts, e);
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }

    async fn patch_schedule(&self, schedule_id: &str, patch: Value) -> Result<()> {
        let url = self.endpoint(&["schedules", schedule_id, "patch"])?;
        let body = json!({
            "patch": patch,
            "requestId": Uuid::new_v4().to_string(),
        });

        self.retry_request(|| async {
            let response = self.send(self.client.post(url.clone()).json(&body)).await?;
            match response.status() {
                status if status.is_success() => Ok(()),
                StatusCode::NOT_FOUND => {
                    Err(BatchExportError::ScheduleNotFound(schedule_id.to_string()))
                }
                status => Err(status_error(status, response).await),
            }
        })
        .await
    }
}

/// Error for a non-success status not handled by the caller
async fn status_error(status: StatusCode, response: Response) -> BatchExportError {
    let message = response.text().await.unwrap_or_default();
    let status = status.as_u16();
    if (500..600).contains(&status) {
        EngineError::ServerError { status, message }.into()
    } else {
        EngineError::ClientError { status, message }.into()
    }
}

#[async_trait]
impl WorkflowEngine for TemporalClient {
    async fn create_schedule(&self, request: &CreateScheduleRequest) -> Result<()> {
        let url = self.schedule_endpoint(&request.schedule_id)?;
        let body = request.to_wire();

        self.retry_request(|| async {
            let response = self.send(self.client.post(url.clone()).json(&body)).await?;
            match response.status() {
                status if status.is_success() => Ok(()),
                StatusCode::CONFLICT => Err(BatchExportError::ScheduleAlreadyExists(
                    request.schedule_id.clone(),
                )),
                status => Err(status_error(status, response).await),
            }
        })
        .await?;

        crate::log_schedule_action!("create", request.schedule_id);
        Ok(())
    }

    async fn pause_schedule(&self, schedule_id: &str, note: Option<&str>) -> Result<()> {
        let note = note.unwrap_or(DEFAULT_PAUSE_NOTE);
        self.patch_schedule(schedule_id, json!({ "pause": note }))
            .await?;
        crate::log_schedule_action!("pause", schedule_id);
        Ok(())
    }

    async fn unpause_schedule(&self, schedule_id: &str, note: Option<&str>) -> Result<()> {
        let note = note.unwrap_or(DEFAULT_UNPAUSE_NOTE);
        self.patch_schedule(schedule_id, json!({ "unpause": note }))
            .await?;
        crate::log_schedule_action!("unpause", schedule_id);
        Ok(())
    }

    async fn delete_schedule(&self, schedule_id: &str) -> Result<()> {
        let url = self.schedule_endpoint(schedule_id)?;

        self.retry_request(|| async {
            let response = self.send(self.client.delete(url.clone())).await?;
            match response.status() {
                status if status.is_success() => Ok(()),
                StatusCode::NOT_FOUND => {
                    Err(BatchExportError::ScheduleNotFound(schedule_id.to_string()))
                }
                status => Err(status_error(status, response).await),
            }
        })
        .await?;

        crate::log_schedule_action!("delete", schedule_id);
        Ok(())
    }

    async fn describe_schedule(&self, schedule_id: &str) -> Result<ScheduleDescription> {
        let url = self.schedule_endpoint(schedule_id)?;

        let wire = self
            .retry_request(|| async {
                let response = self.send(self.client.get(url.clone())).await?;
                match response.status() {
                    status if status.is_success() => response
                        .json::<WireDescribeScheduleResponse>()
                        .await
                        .map_err(|e| EngineError::InvalidResponse(e.to_string()).into()),
                    StatusCode::NOT_FOUND => {
                        Err(BatchExportError::ScheduleNotFound(schedule_id.to_string()))
                    }
                    status => Err(status_error(status, response).await),
                }
            })
            .await?;

        Ok(wire.into_description(schedule_id))
    }

    async fn execute_workflow(&self, request: &StartWorkflowRequest) -> Result<WorkflowHandle> {
        let url = self.endpoint(&["workflows", &request.workflow_id])?;
        let body = request.to_wire();

        let started = self
            .retry_request(|| async {
                let response = self.send(self.client.post(url.clone()).json(&body)).await?;
                match response.status() {
                    status if status.is_success() => response
                        .json::<WireStartWorkflowResponse>()
                        .await
                        .map_err(|e| EngineError::InvalidResponse(e.to_string()).into()),
                    status => Err(status_error(status, response).await),
                }
            })
            .await?;

        tracing::info!(
            workflow_type = %request.workflow_type,
            workflow_id = %request.workflow_id,
            run_id = %started.run_id,
            "Workflow execution started"
        );

        Ok(WorkflowHandle {
            workflow_id: request.workflow_id.clone(),
            run_id: started.run_id,
        })
    }
}
