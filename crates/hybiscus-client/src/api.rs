//! Wire layer: one bounded HTTP exchange per call, normalized into a typed
//! payload or an [`OperationError`].

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::form_urlencoded;

use hybiscus_core::{ErrorDetail, OperationError, ReportKind, TaskId, TaskStatus};

use crate::config::{ClientConfig, CLIENT_IDENTIFIER};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Method};

/// Message used when a non-2xx status response carries no `detail`.
const STATUS_QUERY_FAILED: &str = "Error retrieving task status!";

/// Parsed submission response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResponse {
    /// Task ID, if the service issued one.
    pub task_id: Option<TaskId>,
    /// Initial status of the task.
    pub status: TaskStatus,
}

#[derive(Debug, Deserialize)]
struct SubmitBody {
    #[serde(default)]
    task_id: Option<String>,
    #[serde(default)]
    status: Option<TaskStatus>,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(default)]
    status: Option<TaskStatus>,
    #[serde(default)]
    error_message: Option<Value>,
}

/// Low-level access to the report API endpoints.
#[derive(Clone)]
pub struct Api {
    transport: Arc<dyn HttpTransport>,
    config: ClientConfig,
}

impl Api {
    pub fn new(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport, config }
    }

    /// Submit a report definition for rendering.
    pub async fn submit_job(
        &self,
        kind: ReportKind,
        payload: &Value,
    ) -> Result<SubmitResponse, OperationError> {
        let request = HttpRequest {
            method: Method::Post,
            url: format!("{}/{}", self.config.base_url(), kind.endpoint()),
            headers: self.headers(true),
            body: Some(payload.to_string()),
        };

        let response = self.exchange(request).await?;
        let body = json_body(&response).map_err(|e| e.with_status(TaskStatus::Failed))?;

        if !response.is_success() {
            let detail = detail_of(&body)
                .unwrap_or_else(|| format!("service returned HTTP {}", response.status).into());
            warn!(
                kind = %kind,
                http_status = response.status,
                detail = %detail,
                "Submission rejected"
            );
            return Err(OperationError::service(detail).with_status(TaskStatus::Failed));
        }

        let parsed: SubmitBody = serde_json::from_value(body)
            .map_err(|_| OperationError::protocol(response.body.clone()))?;

        Ok(SubmitResponse {
            task_id: parsed.task_id.filter(|id| !id.is_empty()).map(TaskId::new),
            status: parsed.status.unwrap_or_default(),
        })
    }

    /// Fetch the current status of a task.
    ///
    /// A non-null `error_message` in the body is a terminal failure even
    /// when the HTTP call itself succeeded.
    pub async fn query_status(&self, task_id: &TaskId) -> Result<TaskStatus, OperationError> {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("task_id", task_id.as_str())
            .finish();
        let request = HttpRequest {
            method: Method::Get,
            url: format!("{}/get-task-status?{}", self.config.base_url(), query),
            headers: self.headers(false),
            body: None,
        };

        let response = self
            .exchange(request)
            .await
            .map_err(|e| e.with_task_id(task_id.clone()))?;
        let body = json_body(&response).map_err(|e| e.with_task_id(task_id.clone()))?;

        if !response.is_success() {
            let detail = detail_of(&body).unwrap_or_else(|| STATUS_QUERY_FAILED.into());
            return Err(OperationError::service(detail).with_task_id(task_id.clone()));
        }

        let parsed: StatusBody = serde_json::from_value(body).map_err(|_| {
            OperationError::protocol(response.body.clone()).with_task_id(task_id.clone())
        })?;

        if let Some(message) = parsed.error_message.filter(|m| !m.is_null()) {
            return Err(OperationError::service(ErrorDetail::from_json(message))
                .with_task_id(task_id.clone()));
        }

        Ok(parsed.status.unwrap_or_default())
    }

    /// Download URL of a finished report.
    pub fn report_url(&self, task_id: &TaskId) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("task_id", task_id.as_str())
            .append_pair("api_key", self.config.api_key())
            .finish();
        format!("{}/get-report?{}", self.config.base_url(), query)
    }

    fn headers(&self, with_body: bool) -> Vec<(String, String)> {
        let mut headers = Vec::with_capacity(3);
        if with_body {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        headers.push(("X-API-KEY".to_string(), self.config.api_key().to_string()));
        headers.push(("X-HYB-CLIENT".to_string(), CLIENT_IDENTIFIER.to_string()));
        headers
    }

    /// Send one request under its own timer. Expiry drops the in-flight
    /// request.
    async fn exchange(&self, request: HttpRequest) -> Result<HttpResponse, OperationError> {
        let timeout = self.config.timeout();
        debug!(method = %request.method, url = %redact(&request.url), "Sending request");

        match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Ok(Ok(response)) => {
                debug!(http_status = response.status, "Request completed");
                Ok(response)
            }
            Ok(Err(failure)) => Err(OperationError::transport(failure.0)),
            Err(_) => Err(OperationError::transport(format!(
                "request aborted after {:?}",
                timeout
            ))),
        }
    }
}

/// Parse a JSON body, rejecting anything the service did not label as JSON.
fn json_body(response: &HttpResponse) -> Result<Value, OperationError> {
    if !response.is_json() {
        return Err(OperationError::protocol(response.body.clone()));
    }
    serde_json::from_str(&response.body)
        .map_err(|_| OperationError::protocol(response.body.clone()))
}

fn detail_of(body: &Value) -> Option<ErrorDetail> {
    body.get("detail")
        .filter(|d| !d.is_null())
        .cloned()
        .map(ErrorDetail::from_json)
}

// Report URLs carry the API key; strip the query before logging.
fn redact(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
