//! Generic CRUD entity store: intents, lifecycle events, state, and the
//! reducer that ties them together. One [`EntityStore`] is built per entity
//! kind and owned by the caller's session.

pub mod entity_store;
pub mod event;
pub mod intent;
pub mod reducer;
pub mod state;

pub use entity_store::{EntityStore, PendingRequest};
pub use event::{Completion, Operation, Payload, RequestId, StoreEvent};
pub use intent::{Intent, PageRequest, UpdateKind};
pub use reducer::{reduce, Transition};
pub use state::{CollectionPage, StoreState};
