//! Async client for the Hybiscus report API.
//!
//! Submits a report definition, polls the resulting task on a fixed interval
//! and resolves to the report's download URL. Every failure is reported as a
//! single [`OperationError`].

pub mod api;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod transport;

pub use api::{Api, SubmitResponse};
pub use config::{
    ClientConfig, CLIENT_IDENTIFIER, DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT,
};
pub use error::ConfigError;
pub use orchestrator::HybiscusClient;
pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport, TransportFailure,
};

pub use hybiscus_core::{
    ErrorDetail, ErrorKind, OperationError, OperationResult, ReportKind, TaskHandle, TaskId,
    TaskStatus,
};
pub use tokio_util::sync::CancellationToken;
