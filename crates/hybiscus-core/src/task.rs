//! Task handles and terminal results.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{TaskId, TaskStatus};

/// The kind of report job to submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Full-quality PDF render; counts towards the account quota.
    Build,
    /// Low-quality JPEG preview.
    Preview,
}

impl ReportKind {
    /// Path segment of the submission endpoint.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Build => "build-report",
            Self::Preview => "preview-report",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build => f.write_str("build"),
            Self::Preview => f.write_str("preview"),
        }
    }
}

/// Handle to one submitted remote job.
///
/// Created once the service accepts a submission and returns a task ID.
/// The handle is never updated; later states arrive as new values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle {
    task_id: TaskId,
    submitted_status: TaskStatus,
}

impl TaskHandle {
    /// Create a handle from a submission response.
    pub fn new(task_id: TaskId, submitted_status: TaskStatus) -> Self {
        Self {
            task_id,
            submitted_status,
        }
    }

    /// The task ID issued by the service.
    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// Status reported in the submission response.
    pub fn submitted_status(&self) -> TaskStatus {
        self.submitted_status
    }
}

/// Terminal success of a report task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    /// Task that produced the report.
    pub task_id: TaskId,

    /// Always [`TaskStatus::Success`].
    pub status: TaskStatus,

    /// Download URL of the rendered report.
    pub url: String,
}

impl OperationResult {
    /// Build the result for a task that reached SUCCESS.
    pub fn success(task_id: TaskId, url: impl Into<String>) -> Self {
        Self {
            task_id,
            status: TaskStatus::Success,
            url: url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_kind_endpoints() {
        assert_eq!(ReportKind::Build.endpoint(), "build-report");
        assert_eq!(ReportKind::Preview.endpoint(), "preview-report");
    }

    #[test]
    fn test_handle_keeps_submission_state() {
        let handle = TaskHandle::new(TaskId::new("abc"), TaskStatus::Queued);
        assert_eq!(handle.task_id().as_str(), "abc");
        assert_eq!(handle.submitted_status(), TaskStatus::Queued);
    }

    #[test]
    fn test_result_is_always_success() {
        let result = OperationResult::success(TaskId::new("abc"), "https://example.test/r");
        assert_eq!(result.status, TaskStatus::Success);
        assert_eq!(result.task_id.as_str(), "abc");
    }
}
