// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use bikers_app::config::Config;
use bikers_app::models::Session;
use bikers_app::services::MockIdentityProvider;
use bikers_app::AppContext;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// One request seen by the stub API.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Default)]
pub struct StubState {
    pub bikes: Vec<Value>,
    /// Profiles keyed by bearer token.
    pub profiles: HashMap<String, Value>,
    pub requests: Vec<RecordedRequest>,
    /// Delay before answering profile reads.
    pub profile_delay: Option<Duration>,
    pub fail_bikes: Option<(StatusCode, Option<String>)>,
    pub fail_profile_read: Option<(StatusCode, Option<String>)>,
    pub fail_profile_write: Option<(StatusCode, Option<String>)>,
    /// Answer `GET /api/bikes` with `{}`.
    pub omit_bikes_key: bool,
}

/// In-process stand-in for the bikes API.
#[derive(Clone, Default)]
pub struct StubApi {
    state: Arc<Mutex<StubState>>,
}

#[allow(dead_code)]
impl StubApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stub with the sample catalog loaded.
    pub fn with_catalog() -> Self {
        let stub = Self::new();
        stub.state().bikes = sample_bikes();
        stub
    }

    pub fn state(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap()
    }

    pub fn set_profile(&self, token: &str, profile: Value) {
        self.state().profiles.insert(token.to_string(), profile);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> usize {
        self.state()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/bikes", get(list_bikes))
            .route("/api/bikes/{id}", get(get_bike))
            .route("/api/user/profile", get(get_profile).post(save_profile))
            .with_state(self.clone())
    }

    fn record(&self, method: Method, uri: &Uri, headers: &HeaderMap) -> Option<String> {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.state().requests.push(RecordedRequest {
            method,
            path: uri.path().to_string(),
            authorization: authorization.clone(),
        });
        authorization.and_then(|a| a.strip_prefix("Bearer ").map(str::to_string))
    }
}

fn error_response(status: StatusCode, message: Option<String>) -> Response {
    match message {
        Some(msg) => (status, Json(json!({ "error": msg }))).into_response(),
        None => (status, "upstream failure").into_response(),
    }
}

fn unauthorized() -> Response {
    error_response(StatusCode::UNAUTHORIZED, Some("Unauthorized".to_string()))
}

async fn list_bikes(
    State(stub): State<StubApi>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if stub.record(method, &uri, &headers).is_none() {
        return unauthorized();
    }

    let state = stub.state();
    if let Some((status, message)) = state.fail_bikes.clone() {
        return error_response(status, message);
    }
    if state.omit_bikes_key {
        return Json(json!({})).into_response();
    }
    Json(json!({ "bikes": state.bikes })).into_response()
}

async fn get_bike(
    State(stub): State<StubApi>,
    Path(id): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if stub.record(method, &uri, &headers).is_none() {
        return unauthorized();
    }

    let state = stub.state();
    match state.bikes.iter().find(|b| b["id"] == id.as_str()) {
        Some(bike) => Json(json!({ "bike": bike })).into_response(),
        None => error_response(StatusCode::NOT_FOUND, Some("Bike not found".to_string())),
    }
}

async fn get_profile(
    State(stub): State<StubApi>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let Some(token) = stub.record(method, &uri, &headers) else {
        return unauthorized();
    };

    let delay = stub.state().profile_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let state = stub.state();
    if let Some((status, message)) = state.fail_profile_read.clone() {
        return error_response(status, message);
    }
    let profile = state.profiles.get(&token).cloned().unwrap_or(Value::Null);
    Json(json!({ "profile": profile })).into_response()
}

async fn save_profile(
    State(stub): State<StubApi>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let Some(token) = stub.record(method, &uri, &headers) else {
        return unauthorized();
    };

    let mut state = stub.state();
    if let Some((status, message)) = state.fail_profile_write.clone() {
        return error_response(status, message);
    }
    state.profiles.insert(token, body);
    Json(json!({ "success": true })).into_response()
}

pub fn sample_bikes() -> Vec<Value> {
    vec![
        json!({
            "id": "v1",
            "name": "Classic 350",
            "brand": "Royal Enfield",
            "type": "Cruiser",
            "engine": "349cc single",
            "topSpeed": 114,
            "price": 215000,
            "description": "A retro cruiser.",
            "imageUrl": "https://example.com/classic.png"
        }),
        json!({
            "id": "v2",
            "name": "Duke 390",
            "brand": "KTM",
            "type": "Naked",
            "topSpeed": "167",
            "price": "Ask dealer"
        }),
    ]
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[allow(dead_code)]
pub fn rider() -> Session {
    Session {
        uid: "uid-asha".to_string(),
        display_name: Some("Asha".to_string()),
        email: Some("asha@example.com".to_string()),
        photo_url: None,
    }
}

/// Token the mock provider serves unless a test changes it.
#[allow(dead_code)]
pub const MOCK_TOKEN: &str = "mock-id-token";

/// Start `stub` and build a context against it with the mock provider.
pub async fn test_context(
    stub: &StubApi,
) -> (AppContext<MockIdentityProvider>, Arc<MockIdentityProvider>) {
    let base_url = spawn(stub.router()).await;
    let provider = Arc::new(MockIdentityProvider::new_mock());
    let ctx = AppContext::new(Config::test_default(&base_url), provider.clone()).unwrap();
    (ctx, provider)
}
