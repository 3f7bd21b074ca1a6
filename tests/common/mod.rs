#![allow(dead_code)]

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use smartsession_lib::config::ClientConfig;

/// In-process stand-in for the analysis backend.
#[derive(Default)]
pub struct StubBackend {
    sessions: Mutex<Value>,
    frames: Mutex<Vec<Value>>,
    fail_sessions: AtomicBool,
}

impl StubBackend {
    pub fn set_sessions(&self, sessions: Value) {
        *self.sessions.lock().unwrap() = sessions;
    }

    pub fn fail_sessions(&self, fail: bool) {
        self.fail_sessions.store(fail, Ordering::SeqCst);
    }

    pub fn frames(&self) -> Vec<Value> {
        self.frames.lock().unwrap().clone()
    }
}

async fn sessions(State(stub): State<Arc<StubBackend>>) -> Response {
    if stub.fail_sessions.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let body = stub.sessions.lock().unwrap().clone();
    let body = if body.is_null() { Value::Array(Vec::new()) } else { body };
    Json(body).into_response()
}

async fn process_frame(
    State(stub): State<Arc<StubBackend>>,
    Json(body): Json<Value>,
) -> StatusCode {
    stub.frames.lock().unwrap().push(body);
    StatusCode::OK
}

/// Serves the stub on an ephemeral loopback port.
pub async fn spawn_backend() -> (Arc<StubBackend>, ClientConfig) {
    let stub = Arc::new(StubBackend::default());
    let app = Router::new()
        .route("/teacher/sessions", get(sessions))
        .route("/student/process-frame", post(process_frame))
        .with_state(Arc::clone(&stub));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub backend");
    });

    (stub, ClientConfig::new(format!("http://{addr}")))
}

/// A base URL nothing is listening on.
pub async fn unreachable_config() -> ClientConfig {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    ClientConfig::new(format!("http://{addr}"))
}
