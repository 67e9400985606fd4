//! Task orchestration: submit a report, poll until it settles, resolve to a
//! download URL.

use std::future::Future;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use hybiscus_core::{OperationError, OperationResult, ReportKind, TaskHandle, TaskId, TaskStatus};

use crate::api::Api;
use crate::config::ClientConfig;
use crate::error::ConfigError;
use crate::transport::{HttpTransport, ReqwestTransport};

/// Client for the asynchronous report API.
///
/// Holds only immutable configuration and a shared transport, so it is cheap
/// to clone and safe to use from several tasks at once. Polling the same task
/// ID from several callers at the same time is not coordinated.
///
/// # Example
///
/// ```rust,no_run
/// use hybiscus_client::{ClientConfig, HybiscusClient};
/// use serde_json::json;
///
/// async fn run() -> Result<(), Box<dyn std::error::Error>> {
///     let client = HybiscusClient::new(ClientConfig::new("P09U8Y7G"))?;
///
///     let definition = json!({
///         "type": "Report",
///         "options": { "report_title": "Report title" },
///         "components": []
///     });
///     let result = client.build_report(&definition).await?;
///
///     println!("{} -> {}", result.task_id, result.url);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct HybiscusClient {
    api: Api,
    config: ClientConfig,
}

impl HybiscusClient {
    /// Create a client using the default reqwest transport.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    /// Create a client with a caller-supplied transport.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            api: Api::new(config.clone(), transport),
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Render the final PDF for a report definition.
    pub async fn build_report<T>(&self, definition: &T) -> Result<OperationResult, OperationError>
    where
        T: Serialize + ?Sized,
    {
        let payload = to_payload(definition)?;
        self.run_to_completion(ReportKind::Build, &payload).await
    }

    /// Render a low-quality preview, which does not count towards the quota.
    pub async fn preview_report<T>(
        &self,
        definition: &T,
    ) -> Result<OperationResult, OperationError>
    where
        T: Serialize + ?Sized,
    {
        let payload = to_payload(definition)?;
        self.run_to_completion(ReportKind::Preview, &payload).await
    }

    /// Submit a job and wait until it succeeds, fails or times out.
    pub async fn run_to_completion(
        &self,
        kind: ReportKind,
        payload: &Value,
    ) -> Result<OperationResult, OperationError> {
        self.run_to_completion_with_cancel(kind, payload, &CancellationToken::new())
            .await
    }

    /// Like [`run_to_completion`](Self::run_to_completion), but stops with
    /// [`OperationError::Cancelled`] as soon as `cancel` fires.
    pub async fn run_to_completion_with_cancel(
        &self,
        kind: ReportKind,
        payload: &Value,
        cancel: &CancellationToken,
    ) -> Result<OperationResult, OperationError> {
        let handle = cancellable(cancel, None, self.submit(kind, payload)).await?;
        let task_id = handle.task_id();

        // Fast jobs are often done by the first check; skip the poll delay.
        let status = cancellable(cancel, Some(task_id), self.api.query_status(task_id)).await?;
        if status.is_pending() {
            self.await_completion_with_cancel(task_id, cancel).await?;
        } else if status == TaskStatus::Failed {
            return Err(task_failed(task_id));
        } else {
            debug!(task_id = %task_id, "Task finished before polling");
        }

        info!(task_id = %task_id, kind = %kind, "Report ready");
        Ok(OperationResult::success(
            task_id.clone(),
            self.report_url(task_id),
        ))
    }

    /// Submit a job without waiting for it.
    ///
    /// Fails with a service error when the service accepts the request but
    /// returns no task ID.
    pub async fn submit(
        &self,
        kind: ReportKind,
        payload: &Value,
    ) -> Result<TaskHandle, OperationError> {
        let response = self.api.submit_job(kind, payload).await?;

        let Some(task_id) = response.task_id else {
            warn!(kind = %kind, status = %response.status, "Submission returned no task ID");
            return Err(
                OperationError::service("No task ID returned.").with_status(response.status)
            );
        };

        info!(task_id = %task_id, kind = %kind, status = %response.status, "Task submitted");
        Ok(TaskHandle::new(task_id, response.status))
    }

    /// Query the current status of a task once.
    pub async fn task_status(&self, task_id: &TaskId) -> Result<TaskStatus, OperationError> {
        self.api.query_status(task_id).await
    }

    /// Poll until the task reaches SUCCESS.
    ///
    /// The overall deadline is the configured timeout. FAILED, a status
    /// query error or the deadline end the wait immediately.
    pub async fn await_completion(&self, task_id: &TaskId) -> Result<TaskStatus, OperationError> {
        self.await_completion_with_cancel(task_id, &CancellationToken::new())
            .await
    }

    /// Like [`await_completion`](Self::await_completion), with caller
    /// cancellation.
    pub async fn await_completion_with_cancel(
        &self,
        task_id: &TaskId,
        cancel: &CancellationToken,
    ) -> Result<TaskStatus, OperationError> {
        let timeout = self.config.timeout();
        let deadline = tokio::time::sleep(timeout);
        let last_seen = Mutex::new(None);

        // Whichever branch wins, the others are dropped here: the deadline
        // timer, the poll delay and any in-flight status request.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(task_id = %task_id, "Polling cancelled");
                Err(OperationError::cancelled(Some(task_id.clone())))
            }
            _ = deadline => {
                warn!(
                    task_id = %task_id,
                    timeout_secs = timeout.as_secs_f64(),
                    "Timed out waiting for task"
                );
                let err = OperationError::timeout(task_id.clone(), timeout);
                match last_seen.lock().ok().and_then(|seen| *seen) {
                    Some(status) => Err(err.with_status(status)),
                    None => Err(err),
                }
            }
            result = self.poll_until_success(task_id, &last_seen) => result,
        }
    }

    /// Download URL for a task that reached SUCCESS.
    pub fn report_url(&self, task_id: &TaskId) -> String {
        self.api.report_url(task_id)
    }

    /// Poll loop. Every observed status is recorded in `last_seen`.
    async fn poll_until_success(
        &self,
        task_id: &TaskId,
        last_seen: &Mutex<Option<TaskStatus>>,
    ) -> Result<TaskStatus, OperationError> {
        let interval = self.config.poll_interval();
        let mut attempt: u32 = 0;

        loop {
            tokio::time::sleep(interval).await;
            attempt += 1;

            let status = self.api.query_status(task_id).await?;
            debug!(task_id = %task_id, attempt, status = %status, "Polled task status");
            if let Ok(mut seen) = last_seen.lock() {
                *seen = Some(status);
            }

            if status.is_pending() {
                continue;
            }
            return match status {
                TaskStatus::Success => Ok(status),
                _ => Err(task_failed(task_id)),
            };
        }
    }
}

/// Convert a caller's definition into the JSON payload sent on the wire.
fn to_payload<T: Serialize + ?Sized>(definition: &T) -> Result<Value, OperationError> {
    serde_json::to_value(definition).map_err(|e| {
        OperationError::transport(format!("report definition could not be encoded: {}", e))
    })
}

fn task_failed(task_id: &TaskId) -> OperationError {
    warn!(task_id = %task_id, "Task reported FAILED");
    OperationError::service("Report task failed.")
        .with_task_id(task_id.clone())
        .with_status(TaskStatus::Failed)
}

/// Race `fut` against the caller's token.
async fn cancellable<T>(
    cancel: &CancellationToken,
    task_id: Option<&TaskId>,
    fut: impl Future<Output = Result<T, OperationError>>,
) -> Result<T, OperationError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(OperationError::cancelled(task_id.cloned())),
        result = fut => result,
    }
}
