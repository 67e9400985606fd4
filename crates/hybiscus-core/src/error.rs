//! The single failure channel of the report client.

use std::fmt;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::{TaskId, TaskStatus};

/// Error payload: either a plain message or the structured `detail` the
/// service returned.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorDetail {
    /// Human readable message.
    Message(String),
    /// Structured JSON detail from the service.
    Structured(Value),
}

impl ErrorDetail {
    /// Wrap a JSON value, keeping plain strings as messages.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Message(s),
            other => Self::Structured(other),
        }
    }

    /// The message, if this detail is a plain string.
    pub fn as_message(&self) -> Option<&str> {
        match self {
            Self::Message(s) => Some(s),
            Self::Structured(_) => None,
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(s) => f.write_str(s),
            Self::Structured(v) => write!(f, "{}", v),
        }
    }
}

impl From<String> for ErrorDetail {
    fn from(s: String) -> Self {
        Self::Message(s)
    }
}

impl From<&str> for ErrorDetail {
    fn from(s: &str) -> Self {
        Self::Message(s.to_owned())
    }
}

/// Discriminator for [`OperationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    Protocol,
    Service,
    Timeout,
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Transport => "transport",
            Self::Protocol => "protocol",
            Self::Service => "service",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Every way a submission or poll can fail.
///
/// Each variant carries the task ID and last known status when they exist,
/// plus the error detail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OperationError {
    /// Network failure, abort, or per-call timer expiry before a response.
    #[error("transport error: {detail}")]
    Transport {
        task_id: Option<TaskId>,
        status: Option<TaskStatus>,
        detail: ErrorDetail,
    },

    /// A response arrived but was not the expected JSON. `detail` holds the
    /// raw body.
    #[error("unexpected response from service: {detail}")]
    Protocol {
        task_id: Option<TaskId>,
        status: Option<TaskStatus>,
        detail: ErrorDetail,
    },

    /// The service answered with a structured failure.
    #[error("service error: {detail}")]
    Service {
        task_id: Option<TaskId>,
        status: Option<TaskStatus>,
        detail: ErrorDetail,
    },

    /// The task did not reach SUCCESS before the client-side deadline.
    /// `status` is the last status seen while polling.
    #[error("{detail}")]
    Timeout {
        task_id: TaskId,
        status: Option<TaskStatus>,
        timeout: Duration,
        detail: ErrorDetail,
    },

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled { task_id: Option<TaskId> },
}

impl OperationError {
    /// Transport failure with no task or status attached.
    pub fn transport(detail: impl Into<ErrorDetail>) -> Self {
        Self::Transport {
            task_id: None,
            status: None,
            detail: detail.into(),
        }
    }

    /// Non-JSON response. The raw body becomes the detail.
    pub fn protocol(body: impl Into<String>) -> Self {
        Self::Protocol {
            task_id: None,
            status: None,
            detail: ErrorDetail::Message(body.into()),
        }
    }

    /// Structured failure reported by the service.
    pub fn service(detail: impl Into<ErrorDetail>) -> Self {
        Self::Service {
            task_id: None,
            status: None,
            detail: detail.into(),
        }
    }

    /// Deadline expiry while waiting for `task_id`.
    pub fn timeout(task_id: TaskId, timeout: Duration) -> Self {
        let detail = format!(
            "Timeout waiting for task to complete. Timeout: {} seconds",
            format_secs(timeout)
        );
        Self::Timeout {
            task_id,
            status: None,
            timeout,
            detail: ErrorDetail::Message(detail),
        }
    }

    /// Caller cancellation.
    pub fn cancelled(task_id: Option<TaskId>) -> Self {
        Self::Cancelled { task_id }
    }

    /// Attach the task the error belongs to.
    pub fn with_task_id(mut self, id: TaskId) -> Self {
        match &mut self {
            Self::Transport { task_id, .. }
            | Self::Protocol { task_id, .. }
            | Self::Service { task_id, .. }
            | Self::Cancelled { task_id } => *task_id = Some(id),
            Self::Timeout { task_id, .. } => *task_id = id,
        }
        self
    }

    /// Attach the last known task status.
    pub fn with_status(mut self, new_status: TaskStatus) -> Self {
        match &mut self {
            Self::Transport { status, .. }
            | Self::Protocol { status, .. }
            | Self::Service { status, .. }
            | Self::Timeout { status, .. } => *status = Some(new_status),
            Self::Cancelled { .. } => {}
        }
        self
    }

    /// Which kind of failure this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Protocol { .. } => ErrorKind::Protocol,
            Self::Service { .. } => ErrorKind::Service,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    pub fn task_id(&self) -> Option<&TaskId> {
        match self {
            Self::Transport { task_id, .. }
            | Self::Protocol { task_id, .. }
            | Self::Service { task_id, .. }
            | Self::Cancelled { task_id } => task_id.as_ref(),
            Self::Timeout { task_id, .. } => Some(task_id),
        }
    }

    pub fn status(&self) -> Option<TaskStatus> {
        match self {
            Self::Transport { status, .. }
            | Self::Protocol { status, .. }
            | Self::Service { status, .. }
            | Self::Timeout { status, .. } => *status,
            Self::Cancelled { .. } => None,
        }
    }

    /// The error payload. `None` only for cancellation.
    pub fn detail(&self) -> Option<&ErrorDetail> {
        match self {
            Self::Transport { detail, .. }
            | Self::Protocol { detail, .. }
            | Self::Service { detail, .. }
            | Self::Timeout { detail, .. } => Some(detail),
            Self::Cancelled { .. } => None,
        }
    }
}

fn format_secs(d: Duration) -> String {
    if d.subsec_nanos() == 0 {
        d.as_secs().to_string()
    } else {
        d.as_secs_f64().to_string()
    }
}
