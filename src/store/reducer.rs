use crate::api::Links;
use crate::models::EntityRecord;
use crate::store::event::{Operation, Payload, RequestId, StoreEvent};
use crate::store::state::{CollectionPage, StoreState};
use serde_json::Value;

/// Whether an event changed the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// A completion for a request that is no longer the latest of its
    /// operation, or that was abandoned by a reset. State is untouched.
    Stale,
}

pub fn reduce(state: &mut StoreState, event: StoreEvent) -> Transition {
    match event {
        StoreEvent::Requested { operation, request } => {
            state.in_flight.insert(operation, request);
            state.error_message = None;
            state.update_success = false;
            state.refresh_busy_flags();
            Transition::Applied
        }
        StoreEvent::Fulfilled {
            operation,
            request,
            payload,
        } => {
            if !settle(state, operation, request) {
                return Transition::Stale;
            }
            match payload {
                Payload::Page {
                    records,
                    links,
                    total_items,
                } => {
                    let items = merge_page(&state.entities.items, records, &links);
                    let total_items = total_items.unwrap_or(items.len() as u64);
                    state.entities = CollectionPage {
                        items,
                        total_items,
                        cursor: links.cursor(),
                    };
                    state.links = links;
                }
                Payload::Record(record) => {
                    state.entity = record;
                    if operation.is_mutation() {
                        state.update_success = true;
                    }
                }
                Payload::Deleted => {
                    state.entity = EntityRecord::new();
                    state.update_success = true;
                }
            }
            Transition::Applied
        }
        StoreEvent::Rejected {
            operation,
            request,
            error,
        } => {
            if !settle(state, operation, request) {
                return Transition::Stale;
            }
            state.update_success = false;
            state.error_message = Some(error);
            Transition::Applied
        }
        StoreEvent::BlobSet {
            field,
            data,
            content_type,
        } => {
            if let Some(content_type) = content_type {
                state
                    .entity
                    .insert(format!("{}ContentType", field), Value::String(content_type));
            }
            state.entity.insert(field, data);
            Transition::Applied
        }
        StoreEvent::Reset => {
            *state = StoreState::default();
            Transition::Applied
        }
    }
}

/// Retire `request` if it is the latest one for `operation`.
fn settle(state: &mut StoreState, operation: Operation, request: RequestId) -> bool {
    if state.in_flight.get(&operation) != Some(&request) {
        return false;
    }
    state.in_flight.remove(&operation);
    state.refresh_busy_flags();
    true
}

/// Load-more-on-scroll merge: a page that starts a fresh scroll replaces the
/// collection, any later page is appended after what is already loaded.
pub fn merge_page(
    current: &[EntityRecord],
    incoming: Vec<EntityRecord>,
    links: &Links,
) -> Vec<EntityRecord> {
    if current.is_empty() || links.is_fresh_scroll() {
        return incoming;
    }
    let mut merged = Vec::with_capacity(current.len() + incoming.len());
    merged.extend_from_slice(current);
    merged.extend(incoming);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::links::parse_link_header;
    use crate::error::StoreError;
    use serde_json::json;

    fn record(value: Value) -> EntityRecord {
        EntityRecord::from_value(value).unwrap()
    }

    fn requested(state: &mut StoreState, operation: Operation, id: u64) -> RequestId {
        let request = RequestId(id);
        reduce(state, StoreEvent::Requested { operation, request });
        request
    }

    fn page(state: &mut StoreState, id: u64, names: &[&str], link: &str, total: u64) {
        let request = requested(state, Operation::FetchList, id);
        let records = names.iter().map(|n| record(json!({"name": n}))).collect();
        reduce(
            state,
            StoreEvent::Fulfilled {
                operation: Operation::FetchList,
                request,
                payload: Payload::Page {
                    records,
                    links: parse_link_header(link).unwrap(),
                    total_items: Some(total),
                },
            },
        );
    }

    fn names(state: &StoreState) -> Vec<String> {
        state
            .entities
            .items
            .iter()
            .map(|r| r.get("name").and_then(Value::as_str).unwrap().to_string())
            .collect()
    }

    const PAGE_0: &str = "</api/blogs?page=1&size=2>; rel=\"next\",\
        </api/blogs?page=1&size=2>; rel=\"last\",\
        </api/blogs?page=0&size=2>; rel=\"first\"";
    const PAGE_1: &str = "</api/blogs?page=0&size=2>; rel=\"prev\",\
        </api/blogs?page=1&size=2>; rel=\"last\",\
        </api/blogs?page=0&size=2>; rel=\"first\"";

    #[test]
    fn test_request_sets_busy_flag_and_clears_outcome() {
        let mut state = StoreState {
            update_success: true,
            error_message: Some(StoreError::Transport("down".into())),
            ..Default::default()
        };
        requested(&mut state, Operation::FetchOne, 1);
        assert!(state.loading);
        assert!(!state.updating);
        assert!(!state.update_success);
        assert_eq!(state.error_message, None);

        let mut state = StoreState::new();
        requested(&mut state, Operation::Delete, 1);
        assert!(state.updating);
        assert!(!state.loading);
    }

    #[test]
    fn test_pagination_appends_then_replaces() {
        let mut state = StoreState::new();
        page(&mut state, 1, &["a", "b"], PAGE_0, 3);
        assert_eq!(names(&state), ["a", "b"]);
        assert_eq!(state.entities.cursor, Some(1));
        assert_eq!(state.links.next(), 1);

        page(&mut state, 2, &["c"], PAGE_1, 3);
        assert_eq!(names(&state), ["a", "b", "c"]);
        assert_eq!(state.entities.total_items, 3);
        assert_eq!(state.entities.cursor, None);
        assert_eq!(state.links.next(), 0);
        assert!(!state.loading);

        page(&mut state, 3, &["a", "b"], PAGE_0, 3);
        assert_eq!(names(&state), ["a", "b"]);
    }

    #[test]
    fn test_missing_total_count_uses_collection_length() {
        let mut state = StoreState::new();
        let request = requested(&mut state, Operation::FetchList, 1);
        reduce(
            &mut state,
            StoreEvent::Fulfilled {
                operation: Operation::FetchList,
                request,
                payload: Payload::Page {
                    records: vec![record(json!({"name": "only"}))],
                    links: Links::default(),
                    total_items: None,
                },
            },
        );
        assert_eq!(state.entities.total_items, 1);
    }

    #[test]
    fn test_mutation_success() {
        let mut state = StoreState::new();
        let request = requested(&mut state, Operation::Create, 1);
        let created = record(json!({"id": 1, "handle": "x"}));
        let t = reduce(
            &mut state,
            StoreEvent::Fulfilled {
                operation: Operation::Create,
                request,
                payload: Payload::Record(created.clone()),
            },
        );
        assert_eq!(t, Transition::Applied);
        assert!(state.update_success);
        assert!(!state.updating);
        assert_eq!(state.error_message, None);
        assert_eq!(state.entity, created);
    }

    #[test]
    fn test_fetch_one_does_not_report_update_success() {
        let mut state = StoreState::new();
        let request = requested(&mut state, Operation::FetchOne, 1);
        reduce(
            &mut state,
            StoreEvent::Fulfilled {
                operation: Operation::FetchOne,
                request,
                payload: Payload::Record(record(json!({"id": 9}))),
            },
        );
        assert!(!state.update_success);
        assert!(!state.loading);
        assert_eq!(state.entity.id(), Some("9".into()));
    }

    #[test]
    fn test_failure_keeps_data() {
        let mut state = StoreState::new();
        page(&mut state, 1, &["a", "b"], PAGE_0, 3);
        state.entity = record(json!({"id": 1}));
        let before = state.clone();

        let request = requested(&mut state, Operation::Update, 2);
        let error = StoreError::ValidationRejected {
            status: 400,
            message: "handle must not be null".into(),
        };
        reduce(
            &mut state,
            StoreEvent::Rejected {
                operation: Operation::Update,
                request,
                error: error.clone(),
            },
        );
        assert_eq!(state.error_message, Some(error));
        assert!(!state.update_success);
        assert!(!state.updating);
        assert_eq!(state.entities, before.entities);
        assert_eq!(state.entity, before.entity);
    }

    #[test]
    fn test_delete_empties_entity_but_not_list() {
        let mut state = StoreState::new();
        page(&mut state, 1, &["a", "b"], PAGE_0, 3);
        state.entity = record(json!({"id": 1, "name": "a"}));

        let request = requested(&mut state, Operation::Delete, 2);
        reduce(
            &mut state,
            StoreEvent::Fulfilled {
                operation: Operation::Delete,
                request,
                payload: Payload::Deleted,
            },
        );
        assert!(state.entity.is_empty());
        assert!(state.update_success);
        assert_eq!(names(&state), ["a", "b"]);
        assert_eq!(state.entities.total_items, 3);
    }

    #[test]
    fn test_set_blob_is_local() {
        let mut state = StoreState::new();
        requested(&mut state, Operation::FetchOne, 1);
        state.error_message = Some(StoreError::Transport("x".into()));
        let before = state.clone();

        reduce(
            &mut state,
            StoreEvent::BlobSet {
                field: "photo".into(),
                data: json!("iVBORw0KGgo="),
                content_type: Some("image/png".into()),
            },
        );
        assert_eq!(state.entity.get("photo"), Some(&json!("iVBORw0KGgo=")));
        assert_eq!(
            state.entity.get("photoContentType"),
            Some(&json!("image/png"))
        );
        assert_eq!(state.loading, before.loading);
        assert_eq!(state.updating, before.updating);
        assert_eq!(state.error_message, before.error_message);

        reduce(
            &mut state,
            StoreEvent::BlobSet {
                field: "content".into(),
                data: json!("body text"),
                content_type: None,
            },
        );
        assert!(!state.entity.contains("contentContentType"));
        assert_eq!(state.entity.get("photoContentType"), Some(&json!("image/png")));
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut state = StoreState::new();
        page(&mut state, 1, &["a", "b"], PAGE_0, 3);
        requested(&mut state, Operation::Create, 2);
        state.entity = record(json!({"id": 1}));
        state.error_message = Some(StoreError::Transport("x".into()));

        reduce(&mut state, StoreEvent::Reset);
        assert_eq!(state, StoreState::new());
    }

    #[test]
    fn test_completion_after_reset_is_stale() {
        let mut state = StoreState::new();
        let request = requested(&mut state, Operation::FetchOne, 1);
        reduce(&mut state, StoreEvent::Reset);

        let t = reduce(
            &mut state,
            StoreEvent::Fulfilled {
                operation: Operation::FetchOne,
                request,
                payload: Payload::Record(record(json!({"id": 1}))),
            },
        );
        assert_eq!(t, Transition::Stale);
        assert_eq!(state, StoreState::new());
    }

    #[test]
    fn test_older_completion_is_discarded() {
        let mut state = StoreState::new();
        let first = requested(&mut state, Operation::FetchOne, 1);
        let second = requested(&mut state, Operation::FetchOne, 2);

        let t = reduce(
            &mut state,
            StoreEvent::Fulfilled {
                operation: Operation::FetchOne,
                request: second,
                payload: Payload::Record(record(json!({"id": 2}))),
            },
        );
        assert_eq!(t, Transition::Applied);

        let t = reduce(
            &mut state,
            StoreEvent::Rejected {
                operation: Operation::FetchOne,
                request: first,
                error: StoreError::Transport("late".into()),
            },
        );
        assert_eq!(t, Transition::Stale);
        assert_eq!(state.entity.id(), Some("2".into()));
        assert_eq!(state.error_message, None);
        assert!(!state.loading);
    }

    #[test]
    fn test_single_operation_never_sets_both_flags() {
        let operations = [
            Operation::FetchList,
            Operation::FetchOne,
            Operation::Create,
            Operation::Update,
            Operation::PartialUpdate,
            Operation::Delete,
        ];
        for (i, operation) in operations.into_iter().enumerate() {
            let mut state = StoreState::new();
            let request = requested(&mut state, operation, i as u64);
            assert!(!(state.loading && state.updating), "{operation} pending");

            reduce(
                &mut state,
                StoreEvent::Rejected {
                    operation,
                    request,
                    error: StoreError::ServerError {
                        status: 500,
                        message: "boom".into(),
                    },
                },
            );
            assert!(!state.loading && !state.updating, "{operation} settled");
            assert!(state.error_message.is_some());
            assert!(!state.update_success);
        }
    }
}
