//! Common test utilities and helpers
//!
//! - `TestApp`: the full router over in-memory stores, with direct access to
//!   the state and a task store that counts calls and can be made to fail
//! - Request builders and a `send` that returns status, headers and JSON body
//! - `next_change`: wait for the next non-ack message on a hub subscription

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use taskhub::backend::realtime::Subscription;
use taskhub::backend::server::{build_state, create_app, AppState};
use taskhub::backend::store::{MemoryTaskStore, MemoryUserStore, StoreError, TaskStore, TaskStream};
use taskhub::shared::event::LiveMessage;
use taskhub::shared::task::{DeleteOutcome, NewTask, Task, TaskFilter, TaskId, TaskPatch, UpdateOutcome};
use taskhub::shared::AppConfig;

/// How the counting store misbehaves on writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailure {
    /// Every write returns `StoreError::Unavailable`
    Unavailable,
    /// Every write sleeps this long before going through
    Stall(Duration),
}

/// Memory task store that records how often it was called
#[derive(Default)]
pub struct CountingTaskStore {
    inner: MemoryTaskStore,
    calls: AtomicUsize,
    writes: AtomicUsize,
    failure: Mutex<Option<WriteFailure>>,
}

impl CountingTaskStore {
    pub fn fail_writes(&self, failure: Option<WriteFailure>) {
        *self.failure.lock().unwrap() = failure;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn record(&self, write: bool) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if write {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn write_gate(&self) -> Result<(), StoreError> {
        self.record(true);
        let failure = *self.failure.lock().unwrap();
        match failure {
            None => Ok(()),
            Some(WriteFailure::Unavailable) => Err(StoreError::Unavailable("store is down".to_string())),
            Some(WriteFailure::Stall(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl TaskStore for CountingTaskStore {
    async fn insert(&self, task: NewTask) -> Result<Task, StoreError> {
        self.write_gate().await?;
        self.inner.insert(task).await
    }

    async fn find(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        self.record(false);
        self.inner.find(id).await
    }

    fn list(&self, filter: TaskFilter) -> TaskStream {
        self.record(false);
        self.inner.list(filter)
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<UpdateOutcome, StoreError> {
        self.write_gate().await?;
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: TaskId) -> Result<DeleteOutcome, StoreError> {
        self.write_gate().await?;
        self.inner.delete(id).await
    }

    async fn reorder(&self, ids: &[TaskId]) -> Result<u64, StoreError> {
        self.write_gate().await?;
        self.inner.reorder(ids).await
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub tasks: Arc<CountingTaskStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let tasks = Arc::new(CountingTaskStore::default());
        let state = build_state(config, tasks.clone(), Arc::new(MemoryUserStore::new()));
        let router = taskhub::backend::routes::create_router(state.clone());
        Self { router, state, tasks }
    }

    /// `Cookie` header value carrying a valid session for `email`
    pub fn cookie_for(&self, email: &str) -> String {
        let token = self
            .state
            .sessions
            .issue(email, Map::new())
            .expect("failed to sign test token");
        format!("{}={}", self.state.sessions.cookie_name(), token)
    }

    pub fn subscribe(&self) -> Subscription {
        self.state.hub.register()
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let text = String::from_utf8_lossy(&bytes).to_string();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }

    /// Create a task as `email` through the API and return its JSON
    pub async fn create_task(&self, email: &str, title: &str, category: &str) -> Value {
        let response = self
            .send(json_request(
                Method::POST,
                "/tasks",
                serde_json::json!({ "user": email, "title": title, "category": category }),
                Some(&self.cookie_for(email)),
            ))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "create failed: {}", response.text);
        response.body
    }
}

/// Build the app the way the binary does, over memory stores
pub async fn default_app() -> Router {
    create_app(AppConfig::default()).await
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub text: String,
}

impl TestResponse {
    pub fn set_cookie(&self) -> Option<&str> {
        self.headers.get(header::SET_COOKIE).and_then(|v| v.to_str().ok())
    }
}

pub fn json_request(method: Method, uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

pub fn empty_request(method: Method, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("valid request")
}

/// Next message other than the connection ack
pub async fn next_change(subscription: &mut Subscription) -> LiveMessage {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(1), subscription.recv())
            .await
            .expect("no live message within 1s")
            .expect("subscription closed");
        if !matches!(message, LiveMessage::Connected(_)) {
            return message;
        }
    }
}

/// Assert nothing but the ack is queued
pub async fn assert_no_change(subscription: &mut Subscription) {
    loop {
        match tokio::time::timeout(Duration::from_millis(50), subscription.recv()).await {
            Err(_) => return,
            Ok(Some(LiveMessage::Connected(_))) => continue,
            Ok(other) => panic!("unexpected live message: {:?}", other),
        }
    }
}
