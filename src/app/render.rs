//! Plain-text summaries of store state for the console.

use crate::models::{Blog, EntityKind, EntityRecord, Entry};
use crate::store::EntityStore;

/// One line per record, showing at most this many items of a collection.
const MAX_LISTED: usize = 25;

/// Summarize one store: status line, error, collection, and current entity.
pub fn store_summary(store: &EntityStore) -> Vec<String> {
    let name = store.resource().name;
    let state = store.state();
    let mut lines = Vec::new();

    let status = if state.loading && state.updating {
        "loading, updating"
    } else if state.loading {
        "loading"
    } else if state.updating {
        "updating"
    } else {
        "idle"
    };
    let mut header = format!(
        "[{}] {} of {} loaded, {}",
        name,
        state.entities.len(),
        state.entities.total_items,
        status
    );
    if let Some(page) = state.entities.cursor {
        header.push_str(&format!(", next page {}", page));
    }
    if state.update_success {
        header.push_str(", last update ok");
    }
    lines.push(header);

    if let Some(ref error) = state.error_message {
        lines.push(format!("  error: {}", error));
    }
    for record in state.entities.items.iter().take(MAX_LISTED) {
        lines.push(format!("  {}", record_line(name, record)));
    }
    if state.entities.len() > MAX_LISTED {
        lines.push(format!("  ... {} more", state.entities.len() - MAX_LISTED));
    }
    if !state.entity.is_empty() {
        lines.push(format!("  current: {}", record_line(name, &state.entity)));
    }
    lines
}

/// Human summary of a record, using the typed model when the record fits it
/// and raw JSON otherwise.
pub fn record_line(entity: &str, record: &EntityRecord) -> String {
    let typed = if entity == Blog::NAME {
        record.to_model::<Blog>().ok().map(|b| b.summary())
    } else if entity == Entry::NAME {
        record.to_model::<Entry>().ok().map(|e| e.summary())
    } else {
        None
    };
    typed.unwrap_or_else(|| record.clone().into_value().to_string())
}

pub const HELP: &[&str] = &[
    "Available commands (<kind> is blog or entry):",
    "  /list <kind> [page] [size] [sort]  Fetch a page; sorted when any option is given",
    "  /more <kind>                       Fetch the next page and append it",
    "  /get <kind> <id>                   Load one record as the current entity",
    "  /create <kind> <json>              POST a new record",
    "  /update <kind> <json>              PUT a record (json must carry the id)",
    "  /patch <kind> <json>               PATCH the given fields of a record",
    "  /delete <kind> <id>                DELETE a record",
    "  /blob <kind> <field> <type|-> <data>  Stage blob data on the current entity",
    "  /reset <kind>                      Clear the store",
    "  /show <kind>                       Print the store state",
    "  /config save                       Write the current config to disk",
    "  /help                              This list",
    "  /quit                              Exit",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::MockTransport;
    use crate::models::Resource;
    use serde_json::json;
    use std::sync::Arc;

    fn record(value: serde_json::Value) -> EntityRecord {
        EntityRecord::from_value(value).unwrap()
    }

    #[test]
    fn test_record_line_typed_and_raw() {
        let blog = record(json!({"id": 3, "name": "Rust Notes", "handle": "rust-notes"}));
        assert_eq!(record_line("blog", &blog), "#3 Rust Notes (rust-notes)");

        let odd = record(json!({"id": 4, "name": 12}));
        assert_eq!(record_line("blog", &odd), r#"{"id":4,"name":12}"#);
    }

    #[test]
    fn test_empty_store_summary() {
        let store = EntityStore::new(Resource::of::<Entry>(), Arc::new(MockTransport::new()));
        assert_eq!(store_summary(&store), vec!["[entry] 0 of 0 loaded, idle"]);
    }
}
