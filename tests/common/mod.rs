#![allow(dead_code)]

use async_trait::async_trait;
use riftline::{
    ClockSleeper, Dispatcher, DispatcherConfig, HttpRequest, HttpResponse, ManualClock, Transport,
    TransportError,
};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Simulated start time (epoch millis).
pub const T0: u64 = 1_700_000_000_000;
pub const API_KEY: &str = "RGAPI-test-key";

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<Result<HttpResponse, TransportError>>,
    fallback: Option<HttpResponse>,
    requests: Vec<HttpRequest>,
}

/// In-memory [`Transport`] replaying canned replies in order and recording every request.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, reply: Result<HttpResponse, TransportError>) -> &Self {
        self.script.lock().unwrap().replies.push_back(reply);
        self
    }

    pub fn push_json(&self, status: u16, body: Value) -> &Self {
        self.push(Ok(json_response(status, body)))
    }

    pub fn push_response(&self, response: HttpResponse) -> &Self {
        self.push(Ok(response))
    }

    pub fn push_error(&self, error: TransportError) -> &Self {
        self.push(Err(error))
    }

    /// Reply used once the queue is empty.
    pub fn always(&self, response: HttpResponse) -> &Self {
        self.script.lock().unwrap().fallback = Some(response);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.script.lock().unwrap().requests.clone()
    }

    pub fn calls(&self) -> usize {
        self.script.lock().unwrap().requests.len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut script = self.script.lock().unwrap();
        script.requests.push(request.clone());
        match script.replies.pop_front() {
            Some(reply) => reply,
            None => match &script.fallback {
                Some(response) => Ok(response.clone()),
                None => Err(TransportError::NoResponse("script exhausted".into())),
            },
        }
    }
}

pub fn json_response(status: u16, body: Value) -> HttpResponse {
    let mut headers = HashMap::new();
    headers.insert("content-type".to_string(), "application/json".to_string());
    HttpResponse {
        status,
        status_text: reason(status).to_string(),
        headers,
        body: serde_json::to_vec(&body).unwrap(),
    }
}

pub fn status_response(status: u16) -> HttpResponse {
    HttpResponse { status, status_text: reason(status).to_string(), ..Default::default() }
}

pub fn with_header(mut response: HttpResponse, name: &str, value: &str) -> HttpResponse {
    response.headers.insert(name.to_ascii_lowercase(), value.to_string());
    response
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "",
    }
}

/// Dispatcher wired to `transport`, a manual clock at [`T0`] and a sleeper that advances it.
pub fn dispatcher(
    transport: &ScriptedTransport,
    config: DispatcherConfig,
) -> (Dispatcher, ManualClock, ClockSleeper) {
    let clock = ManualClock::new(T0);
    let sleeper = ClockSleeper::new(clock.clone());
    let dispatcher = Dispatcher::with_transport(config, transport.clone())
        .with_clock(clock.clone())
        .with_sleeper(sleeper.clone());
    (dispatcher, clock, sleeper)
}

pub fn config(base_url: &str) -> DispatcherConfig {
    DispatcherConfig::builder(base_url, API_KEY).build().unwrap()
}

/// Opt into log output with `RUST_LOG=riftline=debug`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
