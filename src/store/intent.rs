use crate::models::EntityRecord;
use serde_json::Value;

/// Everything a caller can ask a store to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    FetchList(PageRequest),
    FetchOne { id: String },
    Create { record: EntityRecord },
    Update { record: EntityRecord, kind: UpdateKind },
    Delete { id: String },
    /// Stage binary or text-blob data on the current entity. Local only.
    SetBlob {
        field: String,
        data: Value,
        content_type: Option<String>,
    },
    Reset,
}

/// Full replace (`PUT`) or partial merge (`PATCH`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    Replace,
    Merge,
}

/// Page selection for a list fetch. Page and size are only sent alongside a
/// sort order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort: Option<String>,
}

impl PageRequest {
    pub fn sorted(page: u32, size: u32, sort: impl Into<String>) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
            sort: Some(sort.into()),
        }
    }

    /// Whatever the server returns by default.
    pub fn unsorted() -> Self {
        Self::default()
    }
}
