//! Entity kinds served by the blog API and the untyped record the stores hold.

pub mod blog;
pub mod entry;
pub mod record;

pub use blog::Blog;
pub use entry::Entry;
pub use record::EntityRecord;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A REST-backed record type with its own store instance.
pub trait EntityKind: Serialize + DeserializeOwned {
    /// Singular name used in commands and logs (e.g. `"blog"`).
    const NAME: &'static str;
    /// Collection segment under `api/` (e.g. `"blogs"`).
    const COLLECTION: &'static str;
}

/// Where a store sends its requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    pub name: &'static str,
    pub collection: &'static str,
}

impl Resource {
    pub fn of<K: EntityKind>() -> Self {
        Self {
            name: K::NAME,
            collection: K::COLLECTION,
        }
    }

    /// Path segments of the collection endpoint, e.g. `["api", "blogs"]`.
    pub fn collection_path(&self) -> Vec<String> {
        vec!["api".to_string(), self.collection.to_string()]
    }

    /// Path segments of a single item, e.g. `["api", "blogs", "3"]`.
    pub fn item_path(&self, id: &str) -> Vec<String> {
        let mut path = self.collection_path();
        path.push(id.to_string());
        path
    }
}

/// Every entity kind the admin panel manages.
pub fn resources() -> [Resource; 2] {
    [Resource::of::<Blog>(), Resource::of::<Entry>()]
}
