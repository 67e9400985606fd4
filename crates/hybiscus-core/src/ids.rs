//! Task identifiers issued by the report service.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one remote report task, as issued by the service.
///
/// Task IDs are opaque; the client never generates or parses them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wrap an ID returned by a submission, or typed in by a user.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The ID exactly as it goes into `task_id` query parameters.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take back the underlying string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        let id = TaskId::new("apoafajfiqwu38r");
        assert_eq!(format!("{}", id), "apoafajfiqwu38r");
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = TaskId::from("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");

        let parsed: TaskId = serde_json::from_str("\"xyz\"").unwrap();
        assert_eq!(parsed.into_inner(), "xyz");
    }
}
