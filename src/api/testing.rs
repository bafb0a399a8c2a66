//! Test doubles for the transport seam.

use crate::api::transport::{ApiRequest, ApiResponse, Method, Transport};
use crate::error::StoreError;
use crate::models::EntityRecord;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

/// Replays queued responses in order and records every request.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, StoreError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: Result<ApiResponse, StoreError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn push_ok(&self, response: ApiResponse) {
        self.push(Ok(response));
    }

    pub fn push_err(&self, error: StoreError) {
        self.push(Err(error));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, StoreError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(StoreError::Transport("no scripted response".into())))
    }
}

/// In-memory implementation of one REST collection, paginated the way the
/// blog server does it (`Link` + `x-total-count` headers).
pub struct MemoryBackend {
    collection: String,
    inner: Mutex<BackendInner>,
}

#[derive(Default)]
struct BackendInner {
    records: BTreeMap<i64, EntityRecord>,
    next_id: i64,
    requests: Vec<ApiRequest>,
}

impl MemoryBackend {
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            inner: Mutex::new(BackendInner {
                next_id: 1,
                ..Default::default()
            }),
        }
    }

    /// Insert records directly, assigning ids in order.
    pub fn seed(&self, records: impl IntoIterator<Item = Value>) {
        let mut inner = self.inner.lock().unwrap();
        for value in records {
            let mut record = EntityRecord::from_value(value).unwrap();
            let id = inner.next_id;
            inner.next_id += 1;
            record.insert("id", json!(id));
            inner.records.insert(id, record);
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().records.len()
    }

    fn list(&self, inner: &BackendInner, request: &ApiRequest) -> ApiResponse {
        let all: Vec<&EntityRecord> = inner.records.values().collect();
        let total = all.len();
        let page: usize = request
            .query_value("page")
            .and_then(|p| p.parse().ok())
            .unwrap_or(0);
        let size: usize = request
            .query_value("size")
            .and_then(|s| s.parse().ok())
            .unwrap_or(total.max(1));

        let items: Vec<Value> = all
            .iter()
            .skip(page * size)
            .take(size)
            .map(|r| (*r).clone().into_value())
            .collect();

        let pages = total.div_ceil(size).max(1);
        let link = |p: usize, rel: &str| {
            format!("</api/{}?page={}&size={}>; rel=\"{}\"", self.collection, p, size, rel)
        };
        let mut sections = Vec::new();
        if page + 1 < pages {
            sections.push(link(page + 1, "next"));
        }
        if page > 0 {
            sections.push(link(page - 1, "prev"));
        }
        sections.push(link(pages - 1, "last"));
        sections.push(link(0, "first"));

        ApiResponse::ok(Value::Array(items))
            .with_header("Link", sections.join(","))
            .with_header("X-Total-Count", total.to_string())
    }
}

fn not_found() -> StoreError {
    StoreError::from_status(404, "Not Found", r#"{"title":"Entity not found"}"#)
}

fn bad_request(detail: &str) -> StoreError {
    StoreError::from_status(400, "Bad Request", &json!({ "detail": detail }).to_string())
}

#[async_trait]
impl Transport for MemoryBackend {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.push(request.clone());

        if request.path.len() < 2 || request.path[0] != "api" || request.path[1] != self.collection
        {
            return Err(not_found());
        }
        let id: Option<i64> = match request.path.get(2) {
            Some(raw) => Some(raw.parse().map_err(|_| bad_request("id must be numeric"))?),
            None => None,
        };
        let body = request
            .body
            .clone()
            .and_then(EntityRecord::from_value)
            .unwrap_or_default();

        match (request.method, id) {
            (Method::Get, None) => Ok(self.list(&inner, &request)),
            (Method::Get, Some(id)) => inner
                .records
                .get(&id)
                .map(|r| ApiResponse::ok(r.clone().into_value()))
                .ok_or_else(not_found),
            (Method::Post, None) => {
                if body.contains("id") {
                    return Err(bad_request("A new entity cannot already have an ID"));
                }
                let id = inner.next_id;
                inner.next_id += 1;
                let mut record = body;
                record.insert("id", json!(id));
                inner.records.insert(id, record.clone());
                Ok(ApiResponse::new(201, record.into_value()))
            }
            (Method::Put, Some(id)) => {
                if body.id() != Some(id.to_string()) {
                    return Err(bad_request("Invalid ID"));
                }
                if !inner.records.contains_key(&id) {
                    return Err(not_found());
                }
                inner.records.insert(id, body.clone());
                Ok(ApiResponse::ok(body.into_value()))
            }
            (Method::Patch, Some(id)) => {
                let record = inner.records.get_mut(&id).ok_or_else(not_found)?;
                for (field, value) in body.fields() {
                    record.insert(field.clone(), value.clone());
                }
                Ok(ApiResponse::ok(record.clone().into_value()))
            }
            (Method::Delete, Some(id)) => inner
                .records
                .remove(&id)
                .map(|_| ApiResponse::new(204, Value::Null))
                .ok_or_else(not_found),
            _ => Err(StoreError::from_status(405, "Method Not Allowed", "")),
        }
    }
}
