//! Scripted in-memory transport for orchestration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hybiscus_client::{
    ClientConfig, HttpRequest, HttpResponse, HttpTransport, HybiscusClient, TransportFailure,
};
use serde_json::{json, Value};

pub const API_KEY: &str = "P09U8Y7G";

/// What the transport does for one request.
#[derive(Debug, Clone)]
pub enum Step {
    Respond(HttpResponse),
    Fail(String),
    /// Never completes; only a timeout or cancellation ends the call.
    Hang,
}

/// Transport that replays a fixed script and records every request.
///
/// Once the script is exhausted the `repeat` step (if any) is used for every
/// further request.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    repeat: Option<Step>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(steps.into()),
            repeat: None,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn repeating(steps: Vec<Step>, repeat: Step) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(steps.into()),
            repeat: Some(repeat),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        self.requests.lock().unwrap().push(request);
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.repeat.clone())
            .expect("transport script exhausted");

        match step {
            Step::Respond(response) => Ok(response),
            Step::Fail(message) => Err(TransportFailure(message)),
            Step::Hang => std::future::pending().await,
        }
    }
}

pub fn json_response(status: u16, body: Value) -> Step {
    Step::Respond(HttpResponse {
        status,
        content_type: Some("application/json".to_string()),
        body: body.to_string(),
    })
}

pub fn submitted(task_id: &str, status: &str) -> Step {
    json_response(200, json!({ "task_id": task_id, "status": status }))
}

pub fn task_status(status: &str) -> Step {
    json_response(200, json!({ "status": status, "error_message": null }))
}

pub fn client(transport: Arc<ScriptedTransport>) -> HybiscusClient {
    client_with(transport, ClientConfig::new(API_KEY))
}

pub fn client_with(transport: Arc<ScriptedTransport>, config: ClientConfig) -> HybiscusClient {
    HybiscusClient::with_transport(config, transport).unwrap()
}

pub fn config_with_timeout(secs: u64) -> ClientConfig {
    ClientConfig::new(API_KEY).with_timeout(Duration::from_secs(secs))
}

pub fn report_definition() -> Value {
    json!({
        "type": "Report",
        "options": {
            "report_title": "Report title",
            "report_byline": "Report byline"
        },
        "components": [
            { "type": "Text", "options": { "text": "Text component" } }
        ]
    })
}
