//! In-process stand-in for the remote user service.
//!
//! Serves the same routes and body shapes under an ephemeral port,
//! counts hits per route so tests can assert on coalescing and cache
//! behavior, and can be told to fail or reject requests on demand.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use url::Url;

pub const KNOWN_EMAIL: &str = "eve.holt@reqres.in";
pub const KNOWN_TOKEN: &str = "QpwL5tke4Pnpja7X4";

const PER_PAGE: u64 = 6;

#[derive(Debug, Clone)]
pub struct CapturedHeaders {
    pub authorization: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Default)]
struct StubState {
    users: Mutex<Vec<Value>>,
    hits: Mutex<HashMap<String, u64>>,
    fail_next: AtomicBool,
    reject_auth: AtomicBool,
    last_headers: Mutex<Option<CapturedHeaders>>,
}

impl StubState {
    fn observe(&self, headers: &HeaderMap) {
        let captured = CapturedHeaders {
            authorization: headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            api_key: headers
                .get("x-api-key")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        };
        *self.last_headers.lock() = Some(captured);
    }

    fn hit(&self, key: &str) {
        *self.hits.lock().entry(key.to_string()).or_insert(0) += 1;
    }

    fn rejecting(&self) -> bool {
        self.reject_auth.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> bool {
        self.fail_next.swap(false, Ordering::SeqCst)
    }
}

/// Handle to a running stub. The server task lives until the test's
/// runtime shuts down.
pub struct StubService {
    addr: SocketAddr,
    state: Arc<StubState>,
}

impl StubService {
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/api", self.addr)).unwrap()
    }

    pub fn hits(&self, key: &str) -> u64 {
        self.state.hits.lock().get(key).copied().unwrap_or(0)
    }

    pub fn list_hits(&self, page: u64) -> u64 {
        self.hits(&format!("list:{page}"))
    }

    pub fn user_hits(&self, id: u64) -> u64 {
        self.hits(&format!("get:{id}"))
    }

    /// Fail the next mutating request with a 500.
    pub fn fail_next(&self) {
        self.state.fail_next.store(true, Ordering::SeqCst);
    }

    /// Answer every collection route with 401 until turned off again.
    pub fn reject_auth(&self, on: bool) {
        self.state.reject_auth.store(on, Ordering::SeqCst);
    }

    pub fn last_headers(&self) -> Option<CapturedHeaders> {
        self.state.last_headers.lock().clone()
    }

    pub fn user_count(&self) -> usize {
        self.state.users.lock().len()
    }
}

/// Starts a stub seeded with the six records the real service answers
/// page 1 with.
pub async fn start_seeded() -> StubService {
    let state = Arc::new(StubState::default());
    *state.users.lock() = seed_users();

    let router = Router::new()
        .route("/api/login", post(login))
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    StubService { addr, state }
}

fn seed_users() -> Vec<Value> {
    [
        (1, "george.bluth", "George", "Bluth"),
        (2, "janet.weaver", "Janet", "Weaver"),
        (3, "emma.wong", "Emma", "Wong"),
        (4, "eve.holt", "Eve", "Holt"),
        (5, "charles.morris", "Charles", "Morris"),
        (6, "tracey.ramos", "Tracey", "Ramos"),
    ]
    .into_iter()
    .map(|(id, email, first, last)| {
        json!({
            "id": id,
            "email": format!("{email}@reqres.in"),
            "first_name": first,
            "last_name": last,
            "avatar": format!("https://reqres.in/img/faces/{id}-image.jpg"),
        })
    })
    .collect()
}

async fn login(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.observe(&headers);
    state.hit("login");

    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
    let password = body.get("password").and_then(Value::as_str).unwrap_or_default();
    if password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing password" })),
        );
    }
    if email == KNOWN_EMAIL {
        (StatusCode::OK, Json(json!({ "token": KNOWN_TOKEN })))
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "user not found" })),
        )
    }
}

async fn list_users(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    state.observe(&headers);
    if state.rejecting() {
        return unauthorized();
    }

    let page: u64 = params
        .get("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1)
        .max(1);
    state.hit(&format!("list:{page}"));

    let users = state.users.lock();
    let total = users.len() as u64;
    let total_pages = (total + PER_PAGE - 1) / PER_PAGE;
    let start = ((page - 1) * PER_PAGE) as usize;
    let data: Vec<Value> = users
        .iter()
        .skip(start)
        .take(PER_PAGE as usize)
        .cloned()
        .collect();

    (
        StatusCode::OK,
        Json(json!({
            "page": page,
            "per_page": PER_PAGE,
            "total": total,
            "total_pages": total_pages,
            "data": data,
        })),
    )
}

async fn get_user(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> (StatusCode, Json<Value>) {
    state.observe(&headers);
    if state.rejecting() {
        return unauthorized();
    }
    state.hit(&format!("get:{id}"));

    let users = state.users.lock();
    match users.iter().find(|u| u["id"] == id) {
        Some(user) => (StatusCode::OK, Json(json!({ "data": user }))),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "user not found" })),
        ),
    }
}

async fn create_user(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.observe(&headers);
    if state.rejecting() {
        return unauthorized();
    }
    if state.take_failure() {
        return internal_error();
    }
    state.hit("create");

    let name = body.get("name").and_then(Value::as_str).unwrap_or_default();
    let (first, last) = name.split_once(' ').unwrap_or((name, ""));

    let mut users = state.users.lock();
    let id = users
        .iter()
        .filter_map(|u| u["id"].as_u64())
        .max()
        .unwrap_or(0)
        + 1;
    users.push(json!({
        "id": id,
        "email": body.get("email").and_then(Value::as_str).unwrap_or_default(),
        "first_name": first,
        "last_name": last,
        "avatar": body.get("avatar").and_then(Value::as_str).unwrap_or_default(),
    }));

    let mut echo = body;
    echo["id"] = json!(id.to_string());
    echo["createdAt"] = json!("2026-08-25T10:00:00.000Z");
    (StatusCode::CREATED, Json(echo))
}

async fn update_user(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.observe(&headers);
    if state.rejecting() {
        return unauthorized();
    }
    if state.take_failure() {
        return internal_error();
    }
    state.hit(&format!("update:{id}"));

    let mut users = state.users.lock();
    if let Some(user) = users.iter_mut().find(|u| u["id"] == id) {
        if let Some(name) = body.get("name").and_then(Value::as_str) {
            let (first, last) = name.split_once(' ').unwrap_or((name, ""));
            user["first_name"] = json!(first);
            user["last_name"] = json!(last);
        }
        if let Some(email) = body.get("email").and_then(Value::as_str) {
            user["email"] = json!(email);
        }
        if let Some(avatar) = body.get("avatar").and_then(Value::as_str) {
            user["avatar"] = json!(avatar);
        }
    }

    let mut echo = body;
    echo["updatedAt"] = json!("2026-08-25T10:05:00.000Z");
    (StatusCode::OK, Json(echo))
}

async fn delete_user(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    state.observe(&headers);
    if state.rejecting() {
        return unauthorized().into_response();
    }
    if state.take_failure() {
        return internal_error().into_response();
    }
    state.hit(&format!("delete:{id}"));

    state.users.lock().retain(|u| u["id"] != id);
    StatusCode::NO_CONTENT.into_response()
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "invalid token" })),
    )
}

fn internal_error() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal error" })),
    )
}
