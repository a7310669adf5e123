//! In-process document store used by the remote tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;

#[derive(Clone, Default)]
struct Shared {
    docs: Arc<Mutex<HashMap<String, Value>>>,
    next: Arc<Mutex<u64>>,
    api_key: Option<String>,
}

impl Shared {
    fn authorized(&self, headers: &HeaderMap) -> bool {
        match &self.api_key {
            None => true,
            Some(key) => headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v == format!("Bearer {}", key)),
        }
    }
}

pub struct FakeStore {
    base_url: String,
    shared: Shared,
}

impl FakeStore {
    pub async fn start() -> Self {
        Self::spawn(None).await
    }

    pub async fn start_with_key(key: &str) -> Self {
        Self::spawn(Some(key.to_string())).await
    }

    async fn spawn(api_key: Option<String>) -> Self {
        let shared = Shared {
            api_key,
            ..Default::default()
        };
        let app = Router::new()
            .route("/documents", post(create))
            .route("/documents/{id}", get(fetch).put(replace))
            .with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake store");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{}", addr),
            shared,
        }
    }

    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    /// Raw stored document, for assertions.
    pub fn document(&self, id: &str) -> Option<Value> {
        self.shared.docs.lock().unwrap().get(id).cloned()
    }

    pub fn document_count(&self) -> usize {
        self.shared.docs.lock().unwrap().len()
    }
}

async fn create(State(shared): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !shared.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let id = {
        let mut next = shared.next.lock().unwrap();
        *next += 1;
        format!("doc-{}", *next)
    };
    shared.docs.lock().unwrap().insert(id.clone(), body);
    (StatusCode::CREATED, Json(serde_json::json!({ "id": id }))).into_response()
}

async fn fetch(State(shared): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !shared.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match shared.docs.lock().unwrap().get(&id) {
        Some(doc) => Json(doc.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, format!("no document {}", id)).into_response(),
    }
}

async fn replace(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !shared.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut docs = shared.docs.lock().unwrap();
    match docs.get_mut(&id) {
        Some(doc) => {
            *doc = body;
            StatusCode::NO_CONTENT.into_response()
        }
        None => (StatusCode::NOT_FOUND, format!("no document {}", id)).into_response(),
    }
}
