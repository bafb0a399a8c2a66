//! Store driver: turns intents into requests, and completions into events.
//!
//! A network intent is split in two halves so that callers running an event
//! loop can keep the store readable while the request is in flight:
//! [`EntityStore::dispatch`] applies the pending transition and returns a
//! [`PendingRequest`]; the caller awaits [`PendingRequest::execute`] wherever
//! it likes and feeds the [`Completion`] back through
//! [`EntityStore::complete`]. The `fetch_*`/`create`/`update`/`delete`
//! methods do both halves in one call.

use crate::api::clean::clean_entity;
use crate::api::links::parse_link_header;
use crate::api::{ApiRequest, ApiResponse, Links, Method, Transport};
use crate::error::StoreError;
use crate::models::{EntityRecord, Resource};
use crate::store::event::{Completion, Operation, Payload, RequestId, StoreEvent};
use crate::store::intent::{Intent, PageRequest, UpdateKind};
use crate::store::reducer::{reduce, Transition};
use crate::store::state::StoreState;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// State container for one entity kind.
pub struct EntityStore {
    resource: Resource,
    transport: Arc<dyn Transport>,
    state: StoreState,
    next_request: u64,
    page_size: u32,
}

/// A request whose pending transition has already been applied.
pub struct PendingRequest {
    operation: Operation,
    request: RequestId,
    api: ApiRequest,
    transport: Arc<dyn Transport>,
}

impl PendingRequest {
    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn id(&self) -> RequestId {
        self.request
    }

    pub fn api_request(&self) -> &ApiRequest {
        &self.api
    }

    pub async fn execute(self) -> Completion {
        let result = self.transport.send(self.api).await;
        Completion {
            operation: self.operation,
            request: self.request,
            result,
        }
    }
}

impl EntityStore {
    pub fn new(resource: Resource, transport: Arc<dyn Transport>) -> Self {
        Self {
            resource,
            transport,
            state: StoreState::new(),
            next_request: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Page size used when a sorted list fetch leaves `size` open.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Apply an intent. Local intents (`SetBlob`, `Reset`) complete
    /// immediately and return `None`; network intents return the request to
    /// execute. Structurally invalid input fails before any state change.
    pub fn dispatch(&mut self, intent: Intent) -> Result<Option<PendingRequest>, StoreError> {
        let (operation, api) = match intent {
            Intent::FetchList(page) => (Operation::FetchList, self.list_request(page)),
            Intent::FetchOne { id } => {
                let id = require_id(&id, Operation::FetchOne)?;
                (
                    Operation::FetchOne,
                    ApiRequest::new(Method::Get, self.resource.item_path(id)),
                )
            }
            Intent::Create { record } => (
                Operation::Create,
                ApiRequest::new(Method::Post, self.resource.collection_path())
                    .with_body(clean_entity(&record).into_value()),
            ),
            Intent::Update { record, kind } => {
                let (operation, method) = match kind {
                    UpdateKind::Replace => (Operation::Update, Method::Put),
                    UpdateKind::Merge => (Operation::PartialUpdate, Method::Patch),
                };
                let id = record.id().unwrap_or_default();
                let id = require_id(&id, operation)?;
                (
                    operation,
                    ApiRequest::new(method, self.resource.item_path(id))
                        .with_body(clean_entity(&record).into_value()),
                )
            }
            Intent::Delete { id } => {
                let id = require_id(&id, Operation::Delete)?;
                (
                    Operation::Delete,
                    ApiRequest::new(Method::Delete, self.resource.item_path(id)),
                )
            }
            Intent::SetBlob {
                field,
                data,
                content_type,
            } => {
                if field.is_empty() {
                    return Err(StoreError::InvalidInput("blob field name is empty".into()));
                }
                reduce(
                    &mut self.state,
                    StoreEvent::BlobSet {
                        field,
                        data,
                        content_type,
                    },
                );
                return Ok(None);
            }
            Intent::Reset => {
                debug!(entity = self.resource.name, "store reset");
                reduce(&mut self.state, StoreEvent::Reset);
                return Ok(None);
            }
        };

        Ok(Some(self.issue(operation, api)))
    }

    /// Feed a completion back. Resolves to the resulting record for single
    /// record operations (the empty record after a delete), `None` for list
    /// fetches, or the failure. A completion that was overtaken by a newer
    /// request or a reset leaves the state alone and resolves to
    /// [`StoreError::Superseded`].
    pub fn complete(&mut self, completion: Completion) -> Result<Option<EntityRecord>, StoreError> {
        let Completion {
            operation,
            request,
            result,
        } = completion;

        let event = match result.and_then(|response| decode(operation, response)) {
            Ok(payload) => StoreEvent::Fulfilled {
                operation,
                request,
                payload,
            },
            Err(error) => StoreEvent::Rejected {
                operation,
                request,
                error,
            },
        };

        let outcome = match &event {
            StoreEvent::Fulfilled {
                payload: Payload::Record(record),
                ..
            } => Ok(Some(record.clone())),
            StoreEvent::Fulfilled {
                payload: Payload::Deleted,
                ..
            } => Ok(Some(EntityRecord::new())),
            StoreEvent::Rejected { error, .. } => Err(error.clone()),
            _ => Ok(None),
        };

        match reduce(&mut self.state, event) {
            Transition::Applied => {
                match &outcome {
                    Ok(_) if operation.is_mutation() => {
                        info!(entity = self.resource.name, %operation, %request, "mutation succeeded")
                    }
                    Ok(_) => debug!(entity = self.resource.name, %operation, %request, "fetch completed"),
                    Err(e) => {
                        warn!(entity = self.resource.name, %operation, %request, error = %e, "request failed")
                    }
                }
                outcome
            }
            Transition::Stale => {
                warn!(entity = self.resource.name, %operation, %request, "discarding stale completion");
                Err(StoreError::Superseded { operation })
            }
        }
    }

    /// Dispatch and, for network intents, execute and complete in place.
    pub async fn run(&mut self, intent: Intent) -> Result<Option<EntityRecord>, StoreError> {
        match self.dispatch(intent)? {
            Some(pending) => {
                let completion = pending.execute().await;
                self.complete(completion)
            }
            None => Ok(None),
        }
    }

    /// Fetch a page into the collection. Server failures land in
    /// `state().error_message`; only invalid input is returned.
    pub async fn fetch_list(&mut self, page: PageRequest) -> Result<(), StoreError> {
        captured(self.run(Intent::FetchList(page)).await)
    }

    pub async fn fetch_one(&mut self, id: &str) -> Result<(), StoreError> {
        let intent = Intent::FetchOne { id: id.to_string() };
        captured(self.run(intent).await)
    }

    pub async fn create(&mut self, record: EntityRecord) -> Result<EntityRecord, StoreError> {
        self.mutate(Intent::Create { record }).await
    }

    pub async fn update(&mut self, record: EntityRecord) -> Result<EntityRecord, StoreError> {
        self.mutate(Intent::Update {
            record,
            kind: UpdateKind::Replace,
        })
        .await
    }

    pub async fn partial_update(&mut self, record: EntityRecord) -> Result<EntityRecord, StoreError> {
        self.mutate(Intent::Update {
            record,
            kind: UpdateKind::Merge,
        })
        .await
    }

    /// Resolves to the empty record on success.
    pub async fn delete(&mut self, id: &str) -> Result<EntityRecord, StoreError> {
        self.mutate(Intent::Delete { id: id.to_string() }).await
    }

    /// Stage blob data on the current entity. Fails on an empty field name.
    pub fn set_blob(
        &mut self,
        field: &str,
        data: Value,
        content_type: Option<&str>,
    ) -> Result<(), StoreError> {
        let intent = Intent::SetBlob {
            field: field.to_string(),
            data,
            content_type: content_type.map(str::to_string),
        };
        self.dispatch(intent).map(|_| ())
    }

    pub fn reset(&mut self) {
        reduce(&mut self.state, StoreEvent::Reset);
    }

    /// Request for the page after the last one loaded, if the server
    /// announced one.
    pub fn next_page(&self, sort: &str) -> Option<PageRequest> {
        self.state
            .entities
            .cursor
            .map(|page| PageRequest::sorted(page, self.page_size, sort))
    }

    async fn mutate(&mut self, intent: Intent) -> Result<EntityRecord, StoreError> {
        self.run(intent).await.map(Option::unwrap_or_default)
    }

    fn issue(&mut self, operation: Operation, api: ApiRequest) -> PendingRequest {
        self.next_request += 1;
        let request = RequestId(self.next_request);
        debug!(
            entity = self.resource.name,
            %operation,
            %request,
            method = %api.method,
            path = %api.display_path(),
            "request issued"
        );
        reduce(&mut self.state, StoreEvent::Requested { operation, request });
        PendingRequest {
            operation,
            request,
            api,
            transport: Arc::clone(&self.transport),
        }
    }

    fn list_request(&self, page: PageRequest) -> ApiRequest {
        let mut api = ApiRequest::new(Method::Get, self.resource.collection_path());
        if let Some(sort) = page.sort {
            api = api
                .with_query("page", page.page.unwrap_or(0))
                .with_query("size", page.size.unwrap_or(self.page_size))
                .with_query("sort", sort);
        }
        api.with_query("cacheBuster", Utc::now().timestamp_millis())
    }
}

fn require_id(id: &str, operation: Operation) -> Result<&str, StoreError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(StoreError::InvalidInput(format!(
            "{} requires a non-empty id",
            operation
        )));
    }
    Ok(id)
}

/// Keep only errors that were not recorded in state.
fn captured<T>(result: Result<T, StoreError>) -> Result<(), StoreError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.is_captured() => Ok(()),
        Err(e) => Err(e),
    }
}

/// Interpret a 2xx response for `operation`.
fn decode(operation: Operation, response: ApiResponse) -> Result<Payload, StoreError> {
    match operation {
        Operation::FetchList => {
            let Value::Array(values) = response.body else {
                return Err(StoreError::Decode("expected a JSON array of records".into()));
            };
            let records = values
                .into_iter()
                .map(|v| {
                    EntityRecord::from_value(v)
                        .ok_or_else(|| StoreError::Decode("list item is not a JSON object".into()))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let links = match response.headers.get("link") {
                Some(header) => {
                    parse_link_header(header).map_err(|e| StoreError::Decode(e.to_string()))?
                }
                None => Links::default(),
            };

            let total_items = match response.headers.get("x-total-count") {
                Some(raw) => match raw.trim().parse::<u64>() {
                    Ok(total) => Some(total),
                    Err(_) => {
                        warn!(value = %raw, "ignoring malformed x-total-count header");
                        None
                    }
                },
                None => None,
            };

            Ok(Payload::Page {
                records,
                links,
                total_items,
            })
        }
        Operation::FetchOne | Operation::Create | Operation::Update | Operation::PartialUpdate => {
            EntityRecord::from_value(response.body)
                .map(Payload::Record)
                .ok_or_else(|| StoreError::Decode("expected a JSON object".into()))
        }
        Operation::Delete => Ok(Payload::Deleted),
    }
}
