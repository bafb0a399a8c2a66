use crate::api::Links;
use crate::error::StoreError;
use crate::models::EntityRecord;
use crate::store::event::{Operation, RequestId};
use std::collections::BTreeMap;

/// The list slot: records in server order plus pagination metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionPage {
    pub items: Vec<EntityRecord>,
    pub total_items: u64,
    /// Next page to request; `None` once the last page is loaded.
    pub cursor: Option<u32>,
}

impl CollectionPage {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// State of one entity kind's store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    pub loading: bool,
    pub updating: bool,
    pub update_success: bool,
    pub error_message: Option<StoreError>,
    pub entities: CollectionPage,
    pub entity: EntityRecord,
    pub links: Links,
    pub(crate) in_flight: BTreeMap<Operation, RequestId>,
}

impl StoreState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.loading || self.updating
    }

    /// Latest request issued for `operation` that has not settled yet.
    pub fn pending(&self, operation: Operation) -> Option<RequestId> {
        self.in_flight.get(&operation).copied()
    }

    pub(crate) fn refresh_busy_flags(&mut self) {
        self.loading = self.in_flight.keys().any(|op| !op.is_mutation());
        self.updating = self.in_flight.keys().any(|op| op.is_mutation());
    }
}
