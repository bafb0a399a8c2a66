//! Record cleaning applied before create/update/partial-update.
//!
//! Forms submit blank inputs as empty strings and unselected relationship
//! dropdowns as `{ "id": "" }`; neither is a real value for the server.

use crate::models::EntityRecord;
use serde_json::Value;

/// Copy of `record` without blank fields. Everything else passes through
/// untouched, with no type coercion.
pub fn clean_entity(record: &EntityRecord) -> EntityRecord {
    let mut cleaned = record.clone();
    cleaned.retain(|_, value| !is_blank(value));
    cleaned
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty(),
        Value::Object(fields) => match fields.get("id") {
            Some(Value::String(id)) => id.is_empty(),
            Some(Value::Number(id)) => id.as_i64() == Some(-1),
            _ => false,
        },
        _ => false,
    }
}
