//! Scripted in-memory transport and fixtures shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};

use talentdesk_core::api::{ApiClient, ApiError, HttpRequest, HttpResponse, Transport};
use talentdesk_core::auth::{MemoryCredentialStore, SessionHandle, SessionManager};

struct Scripted {
    delay: Option<Duration>,
    outcome: Result<HttpResponse, ApiError>,
}

/// Answers requests from per-route queues and records everything it saw.
/// An unscripted route answers 404 with an envelope body.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    seen: Mutex<Vec<HttpRequest>>,
}

fn route_key(method: &Method, path: &str) -> String {
    format!("{} {}", method, path)
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, method: Method, path: &str, delay: Option<Duration>, outcome: Result<HttpResponse, ApiError>) {
        self.routes
            .lock()
            .expect("routes lock")
            .entry(route_key(&method, path))
            .or_default()
            .push_back(Scripted { delay, outcome });
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.push(method, path, None, Ok(HttpResponse::new(status, body.to_string())));
    }

    /// Script a body that is not JSON, such as a proxy's error page.
    pub fn respond_raw(&self, method: Method, path: &str, status: u16, body: &str) {
        self.push(method, path, None, Ok(HttpResponse::new(status, body.to_string())));
    }

    pub fn respond_after(&self, delay: Duration, method: Method, path: &str, status: u16, body: Value) {
        self.push(method, path, Some(delay), Ok(HttpResponse::new(status, body.to_string())));
    }

    pub fn fail(&self, method: Method, path: &str, error: ApiError) {
        self.push(method, path, None, Err(error));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().expect("seen lock").clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<HttpRequest> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.seen.lock().expect("seen lock").last().cloned()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let key = route_key(&request.method, &request.path);
        self.seen.lock().expect("seen lock").push(request);

        let scripted = self
            .routes
            .lock()
            .expect("routes lock")
            .get_mut(&key)
            .and_then(VecDeque::pop_front);

        match scripted {
            Some(Scripted { delay, outcome }) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                outcome
            }
            None => Ok(HttpResponse::new(
                404,
                json!({ "success": false, "message": "Route not found" }).to_string(),
            )),
        }
    }
}

pub struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub store: Arc<MemoryCredentialStore>,
    pub session: SessionHandle,
    pub api: ApiClient,
    pub manager: SessionManager,
}

pub fn harness() -> Harness {
    harness_with_store(Arc::new(MemoryCredentialStore::new()))
}

pub fn harness_with_store(store: Arc<MemoryCredentialStore>) -> Harness {
    let transport = ScriptedTransport::new();
    let session = SessionHandle::new(store.clone());
    let api = ApiClient::new(transport.clone(), session.clone());
    let manager = SessionManager::new(api.clone());
    Harness {
        transport,
        store,
        session,
        api,
        manager,
    }
}

pub fn user_json(id: &str, role: &str) -> Value {
    json!({
        "_id": id,
        "firstName": "Ada",
        "lastName": "Lovelace",
        "fullName": "Ada Lovelace",
        "email": "ada@example.com",
        "role": role,
        "isActive": true
    })
}

pub fn auth_ok(token: &str, user: Value) -> Value {
    json!({
        "success": true,
        "message": "Login successful",
        "data": { "token": token, "user": user }
    })
}

pub fn failure(message: &str) -> Value {
    json!({ "success": false, "message": message })
}

pub fn data(value: Value) -> Value {
    json!({ "success": true, "data": value })
}

/// Sign in through the manager with a scripted successful login.
pub async fn sign_in(h: &Harness, token: &str, role: &str) {
    h.transport
        .respond(Method::POST, "/auth/login", 200, auth_ok(token, user_json("u1", role)));
    let session = h.manager.login("ada@example.com", "secret").await;
    assert!(session.is_authenticated(), "fixture login failed: {:?}", session);
}
