// crates/workcert-client/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Local HTTP server and tracker helpers for client tests.
// Purpose: Serve canned responses and capture what the client sent.
// Dependencies: tiny_http, workcert-client, workcert-tracker
// ============================================================================

//! ## Overview
//! [`CannedServer`] answers a fixed sequence of requests on `127.0.0.1:0`
//! from a background thread and returns every captured request when joined.
//! [`ProgressLog`] records the progress values of every snapshot a tracker
//! broadcasts.

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Shared test helpers may be unused in some cases."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;
use workcert_client::PortalClient;
use workcert_client::RequestEvent;
use workcert_client::RequestLog;
use workcert_config::ApiConfig;
use workcert_tracker::RequestTracker;
use workcert_tracker::Subscription;

// ============================================================================
// SECTION: Canned Responses
// ============================================================================

/// One scripted response.
#[derive(Clone)]
pub struct Canned {
    /// HTTP status.
    pub status: u16,
    /// Body bytes.
    pub body: Vec<u8>,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
    /// Delay before responding.
    pub delay: Duration,
}

impl Canned {
    /// JSON response with `status`.
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string().into_bytes(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            delay: Duration::ZERO,
        }
    }

    /// Raw response with `status`.
    pub fn raw(status: u16, body: &[u8]) -> Self {
        Self {
            status,
            body: body.to_vec(),
            headers: Vec::new(),
            delay: Duration::ZERO,
        }
    }

    /// Adds a header.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Delays the response.
    pub const fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Request observed by the server.
#[derive(Debug, Clone)]
pub struct Captured {
    /// HTTP method.
    pub method: String,
    /// Request path and query.
    pub url: String,
    /// Content type header, if any.
    pub content_type: Option<String>,
    /// Raw body.
    pub body: Vec<u8>,
}

impl Captured {
    /// Body as lossy UTF-8.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body as JSON.
    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Local server answering scripted responses in order.
pub struct CannedServer {
    /// Base URL of the server.
    pub base_url: String,
    /// Worker thread.
    handle: thread::JoinHandle<Vec<Captured>>,
}

impl CannedServer {
    /// Starts a server for `responses`.
    pub fn start(responses: Vec<Canned>) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let handle = thread::spawn(move || {
            let mut captured = Vec::new();
            for canned in responses {
                let Ok(mut request) = server.recv() else {
                    break;
                };
                let mut body = Vec::new();
                let _ = request.as_reader().read_to_end(&mut body);
                let content_type = request
                    .headers()
                    .iter()
                    .find(|header| header.field.equiv("Content-Type"))
                    .map(|header| header.value.as_str().to_string());
                captured.push(Captured {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    content_type,
                    body,
                });
                if !canned.delay.is_zero() {
                    thread::sleep(canned.delay);
                }
                let mut response =
                    Response::from_data(canned.body).with_status_code(canned.status);
                for (name, value) in &canned.headers {
                    response = response
                        .with_header(Header::from_bytes(name.as_bytes(), value.as_bytes()).unwrap());
                }
                let _ = request.respond(response);
            }
            captured
        });
        Self {
            base_url: format!("http://{addr}"),
            handle,
        }
    }

    /// Waits for the scripted responses and returns captured requests.
    pub fn finish(self) -> Vec<Captured> {
        self.handle.join().unwrap()
    }
}

// ============================================================================
// SECTION: Client Fixtures
// ============================================================================

/// Builds a client for `base_url` with default settings.
pub fn portal(base_url: &str, tracker: &RequestTracker) -> PortalClient {
    portal_with(
        ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        },
        tracker,
    )
}

/// Builds a client from `config`.
pub fn portal_with(config: ApiConfig, tracker: &RequestTracker) -> PortalClient {
    PortalClient::new(&config, tracker.clone()).unwrap()
}

/// Progress values of every broadcast snapshot.
pub struct ProgressLog {
    /// Recorded snapshots.
    history: Arc<Mutex<Vec<Vec<u8>>>>,
    /// Live subscription.
    _subscription: Subscription,
}

impl ProgressLog {
    /// Subscribes to `tracker`.
    pub fn attach(tracker: &RequestTracker) -> Self {
        let history = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&history);
        let subscription = tracker.subscribe(move |snapshot| {
            sink.lock().unwrap().push(snapshot.iter().map(|record| record.progress).collect());
        });
        Self {
            history,
            _subscription: subscription,
        }
    }

    /// Returns recorded snapshots.
    pub fn snapshots(&self) -> Vec<Vec<u8>> {
        self.history.lock().unwrap().clone()
    }
}

/// Request log collecting events in memory.
#[derive(Default)]
pub struct CaptureLog(pub Mutex<Vec<RequestEvent>>);

impl RequestLog for CaptureLog {
    fn record(&self, event: &RequestEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}
