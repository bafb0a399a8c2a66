use crate::api::Transport;
use crate::config::AppConfig;
use crate::models::resources;
use crate::store::EntityStore;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Everything the console knows between events.
pub struct Session {
    pub config: AppConfig,
    /// One store per entity kind, keyed by singular name.
    pub stores: BTreeMap<&'static str, EntityStore>,
    /// Sort order of the last sorted list fetch per kind, reused by `/more`.
    pub last_sort: HashMap<&'static str, String>,
    output: Vec<String>,
    /// Stdin reached end of file; quit once pending requests settle.
    pub input_closed: bool,
    pub should_quit: bool,
}

impl Session {
    pub fn new(config: AppConfig, transport: Arc<dyn Transport>) -> Self {
        let page_size = config.pagination.page_size;
        let stores = resources()
            .into_iter()
            .map(|resource| {
                let store =
                    EntityStore::new(resource, Arc::clone(&transport)).with_page_size(page_size);
                (resource.name, store)
            })
            .collect();
        Self {
            config,
            stores,
            last_sort: HashMap::new(),
            output: Vec::new(),
            input_closed: false,
            should_quit: false,
        }
    }

    /// Resolve a kind as typed by the user: singular name or collection,
    /// case-insensitive.
    pub fn resolve_kind(&self, kind: &str) -> Option<&'static str> {
        let kind = kind.to_lowercase();
        self.stores
            .values()
            .map(EntityStore::resource)
            .find(|r| r.name == kind || r.collection == kind)
            .map(|r| r.name)
    }

    pub fn store(&self, entity: &str) -> Option<&EntityStore> {
        self.stores.get(entity)
    }

    pub fn store_mut(&mut self, entity: &str) -> Option<&mut EntityStore> {
        self.stores.get_mut(entity)
    }

    /// Names of stores with a request in flight.
    pub fn busy_stores(&self) -> Vec<&'static str> {
        self.stores
            .iter()
            .filter(|(_, store)| store.state().is_busy())
            .map(|(name, _)| *name)
            .collect()
    }

    pub fn print(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }

    pub fn error(&mut self, line: impl AsRef<str>) {
        self.output.push(format!("!!! {}", line.as_ref()));
    }

    /// Lines produced since the last drain, oldest first.
    pub fn drain_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }
}
