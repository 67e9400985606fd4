//! Status of a remote report task.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a report task as reported by the service.
///
/// A status is only ever taken from a service response, never inferred
/// locally. Values the client does not recognise map to [`TaskStatus::Unknown`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Task accepted and created.
    Created,
    /// Task waiting for a renderer.
    Queued,
    /// Task is being rendered.
    Running,
    /// Report rendered and ready for download.
    Success,
    /// Rendering failed.
    Failed,
    /// Missing or unrecognised status.
    #[default]
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// Returns true if the task can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }

    /// Returns true if the task may still reach a terminal state.
    pub fn is_pending(&self) -> bool {
        !self.is_terminal()
    }

    /// Wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(TaskStatus::Success.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Queued.is_pending());
        assert!(TaskStatus::Running.is_pending());
        assert!(TaskStatus::Created.is_pending());
        assert!(TaskStatus::Unknown.is_pending());
    }

    #[test]
    fn test_wire_names() {
        let status: TaskStatus = serde_json::from_str("\"QUEUED\"").unwrap();
        assert_eq!(status, TaskStatus::Queued);
        assert_eq!(
            serde_json::to_string(&TaskStatus::Success).unwrap(),
            "\"SUCCESS\""
        );
    }

    #[test]
    fn test_unrecognised_status_is_unknown() {
        let status: TaskStatus = serde_json::from_str("\"PAUSED\"").unwrap();
        assert_eq!(status, TaskStatus::Unknown);

        let status: TaskStatus = serde_json::from_str("\"\"").unwrap();
        assert_eq!(status, TaskStatus::Unknown);
    }
}
