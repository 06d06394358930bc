use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const VALID_LOGIN_CODE: &str = "valid-code";
pub const CUSTOMER_COUNT: usize = 25;

type Reply = (StatusCode, Json<Value>);

/// Backend double with server-side token state
pub struct MockBackend {
    valid_access: Mutex<String>,
    valid_refresh: Mutex<String>,
    next_refresh: Mutex<String>,
    refresh_calls: AtomicUsize,
    refresh_fails: AtomicBool,
    refresh_delay_ms: AtomicU64,
    request_ids: Mutex<Vec<String>>,
    public_calls_with_auth: AtomicUsize,
    customers: Mutex<Vec<Value>>,
}

impl MockBackend {
    pub fn new() -> Self {
        let customers = (1..=CUSTOMER_COUNT)
            .map(|i| json!({"id": i, "name": format!("Customer {}", i), "phone": format!("1380000{:04}", i)}))
            .collect();

        Self {
            valid_access: Mutex::new("abc".to_string()),
            valid_refresh: Mutex::new("def".to_string()),
            next_refresh: Mutex::new("def".to_string()),
            refresh_calls: AtomicUsize::new(0),
            refresh_fails: AtomicBool::new(false),
            refresh_delay_ms: AtomicU64::new(0),
            request_ids: Mutex::new(Vec::new()),
            public_calls_with_auth: AtomicUsize::new(0),
            customers: Mutex::new(customers),
        }
    }

    /// Invalidate the current access token; the next refresh hands out
    /// `access` and rotates the refresh token to `refresh`
    pub fn expire_access_token(&self, access: &str, refresh: &str) {
        *self.valid_access.lock() = access.to_string();
        *self.next_refresh.lock() = refresh.to_string();
    }

    pub fn fail_refresh(&self) {
        self.refresh_fails.store(true, Ordering::SeqCst);
    }

    pub fn slow_refresh(&self, delay: Duration) {
        self.refresh_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn public_calls_with_auth(&self) -> usize {
        self.public_calls_with_auth.load(Ordering::SeqCst)
    }

    pub fn request_ids(&self) -> Vec<String> {
        self.request_ids.lock().clone()
    }

    fn record(&self, headers: &HeaderMap) {
        if let Some(id) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
            self.request_ids.lock().push(id.to_string());
        }
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), Reply> {
        self.record(headers);
        let expected = format!("Bearer {}", self.valid_access.lock());
        match headers.get("authorization").and_then(|v| v.to_str().ok()) {
            Some(value) if value == expected => Ok(()),
            _ => Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({"message": "token expired"})),
            )),
        }
    }

    fn record_public(&self, headers: &HeaderMap) {
        self.record(headers);
        if headers.contains_key("authorization") {
            self.public_calls_with_auth.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn ok(data: Value) -> Reply {
    (StatusCode::OK, Json(json!({"success": true, "data": data})))
}

fn coded(data: Value) -> Reply {
    (StatusCode::OK, Json(json!({"code": 200, "data": data, "message": "ok"})))
}

fn admin_user() -> Value {
    json!({"id": 1, "nickname": "Ada", "phone": "13800000001", "status": 1})
}

pub fn router(backend: Arc<MockBackend>) -> Router {
    let api = Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/user", get(user))
        .route("/init", get(init))
        .route("/brands", get(brands))
        .route("/products", get(products))
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/:id", put(update_customer))
        .route("/consumers", get(consumers))
        .route("/benefits", get(benefits))
        .route("/broken", get(broken))
        .with_state(backend);

    Router::new().nest("/api/mini", api)
}

async fn login(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    backend.record_public(&headers);
    if body.get("code").and_then(Value::as_str) != Some(VALID_LOGIN_CODE) {
        return (
            StatusCode::OK,
            Json(json!({"success": false, "message": "invalid login code"})),
        );
    }

    let access = backend.valid_access.lock().clone();
    let refresh = backend.valid_refresh.lock().clone();
    ok(json!({
        "user": admin_user(),
        "tokens": {"access_token": access, "refresh_token": refresh, "expires_in": 3600},
        "session_key": "sk-1",
        "coupons": [{"id": 10}],
        "privileges": []
    }))
}

async fn refresh(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    backend.record_public(&headers);
    backend.refresh_calls.fetch_add(1, Ordering::SeqCst);

    let delay = backend.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let presented = body.get("refresh_token").and_then(Value::as_str).unwrap_or_default();
    let valid = backend.valid_refresh.lock().clone();
    if backend.refresh_fails.load(Ordering::SeqCst) || presented != valid {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "refresh token expired"})),
        );
    }

    let next = backend.next_refresh.lock().clone();
    *backend.valid_refresh.lock() = next.clone();
    let access = backend.valid_access.lock().clone();
    ok(json!({"tokens": {"access_token": access, "refresh_token": next}}))
}

async fn user(State(backend): State<Arc<MockBackend>>, headers: HeaderMap) -> Reply {
    if let Err(reply) = backend.authorize(&headers) {
        return reply;
    }
    coded(json!({"user": admin_user(), "coupons": [{"id": 10}, {"id": 11}]}))
}

async fn init(State(backend): State<Arc<MockBackend>>, headers: HeaderMap) -> Reply {
    backend.record_public(&headers);
    ok(json!({"pages": [], "brands": [{"id": 1, "name_en": "Omega"}], "shops": []}))
}

async fn brands(State(backend): State<Arc<MockBackend>>, headers: HeaderMap) -> Reply {
    if let Err(reply) = backend.authorize(&headers) {
        return reply;
    }
    ok(json!([
        {"id": 1, "name_en": "Omega", "name_cn": "欧米茄"},
        {"id": 2, "name_en": "omega vintage", "name_cn": "欧米茄古董"},
        {"id": 3, "name_en": "Rolex", "name_cn": "劳力士"},
        {"id": 4, "name_en": "Patek Philippe", "name_cn": "百达翡丽"}
    ]))
}

async fn products(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    if let Err(reply) = backend.authorize(&headers) {
        return reply;
    }
    ok(json!({"list": [], "query": query}))
}

async fn list_customers(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    if let Err(reply) = backend.authorize(&headers) {
        return reply;
    }
    let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let page_size: usize = query.get("pageSize").and_then(|p| p.parse().ok()).unwrap_or(20);

    let customers = backend.customers.lock().clone();
    let start = (page.saturating_sub(1) * page_size).min(customers.len());
    let end = (start + page_size).min(customers.len());

    (
        StatusCode::OK,
        Json(json!({
            "code": 0,
            "data": {
                "list": customers[start..end],
                "total": customers.len(),
                "hasMore": end < customers.len()
            }
        })),
    )
}

async fn create_customer(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Reply {
    if let Err(reply) = backend.authorize(&headers) {
        return reply;
    }
    body["id"] = json!(100);
    backend.customers.lock().insert(0, body.clone());
    ok(body)
}

async fn update_customer(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(mut body): Json<Value>,
) -> Reply {
    if let Err(reply) = backend.authorize(&headers) {
        return reply;
    }
    body["id"] = json!(id);
    ok(body)
}

async fn consumers(State(backend): State<Arc<MockBackend>>, headers: HeaderMap) -> Reply {
    if let Err(reply) = backend.authorize(&headers) {
        return reply;
    }
    ok(json!({
        "users": [
            {"id": 1, "name": "Ada", "phone": "13800001111", "card_number": "VIP-0001"},
            {"id": 2, "name": "Bea", "phone": "13900002222", "card_number": "VIP-0002"}
        ],
        "total": 2
    }))
}

async fn benefits(State(backend): State<Arc<MockBackend>>, headers: HeaderMap) -> Reply {
    if let Err(reply) = backend.authorize(&headers) {
        return reply;
    }
    ok(json!({
        "coupons": [
            {"id": 1, "is_valid": true, "status": 1},
            {"id": 2, "is_valid": false, "status": 1}
        ],
        "privileges": [{"id": 3, "is_valid": true, "status": true}],
        "total_count": 3
    }))
}

async fn broken(State(backend): State<Arc<MockBackend>>, headers: HeaderMap) -> Reply {
    backend.record(&headers);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"message": "database unavailable"})),
    )
}
