//! Hybiscus Core Domain Types
//!
//! This crate contains the report client's domain types with no dependencies on:
//! - Network/HTTP
//! - Runtime specifics
//!
//! Submitting and polling live in `hybiscus-client`.

pub mod error;
pub mod ids;
pub mod status;
pub mod task;

// Re-export commonly used types
pub use error::{ErrorDetail, ErrorKind, OperationError};
pub use ids::TaskId;
pub use status::TaskStatus;
pub use task::{OperationResult, ReportKind, TaskHandle};
