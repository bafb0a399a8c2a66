use crate::api::{ApiResponse, Links};
use crate::error::StoreError;
use crate::models::EntityRecord;
use serde_json::Value;
use std::fmt;

/// Monotonically increasing per store. Only the latest id issued for an
/// operation may settle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    FetchList,
    FetchOne,
    Create,
    Update,
    PartialUpdate,
    Delete,
}

impl Operation {
    /// Mutations drive the `updating` flag, reads drive `loading`.
    pub fn is_mutation(self) -> bool {
        !matches!(self, Operation::FetchList | Operation::FetchOne)
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::FetchList => "fetch-list",
            Operation::FetchOne => "fetch-one",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::PartialUpdate => "partial-update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoded result of a successful request.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Page {
        records: Vec<EntityRecord>,
        links: Links,
        total_items: Option<u64>,
    },
    Record(EntityRecord),
    Deleted,
}

/// Input to the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Requested {
        operation: Operation,
        request: RequestId,
    },
    Fulfilled {
        operation: Operation,
        request: RequestId,
        payload: Payload,
    },
    Rejected {
        operation: Operation,
        request: RequestId,
        error: StoreError,
    },
    BlobSet {
        field: String,
        data: Value,
        content_type: Option<String>,
    },
    Reset,
}

/// Raw outcome of a request, handed back to the store that issued it.
#[derive(Debug)]
pub struct Completion {
    pub operation: Operation,
    pub request: RequestId,
    pub result: Result<ApiResponse, StoreError>,
}
