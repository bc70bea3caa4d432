use crate::client::{ProcedureError, TodoProcedures};
use crate::dto;
use std::collections::HashMap;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Identifies one cached todo list. Lists are kept per session owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListKey(pub String);

impl ListKey {
    pub fn for_owner(owner_id: &str) -> ListKey {
        ListKey(owner_id.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    Invalidate(ListKey),
}

/// Sending half handed to anything that mutates todos, so successes can mark the
/// cached list stale without holding the cache itself
#[derive(Clone)]
pub struct Invalidator {
    sender: UnboundedSender<CacheEvent>,
}

impl Invalidator {
    pub fn invalidate(&self, key: &ListKey) {
        if self.sender.send(CacheEvent::Invalidate(key.clone())).is_err() {
            debug!(?key, "cache already dropped, nothing to invalidate");
        }
    }
}

struct CachedList {
    todos: Vec<dto::Todo>,
    stale: bool,
}

/// Holds the last-fetched todo list per [ListKey]. Reads drain pending invalidations first,
/// so a list invalidated by a mutation is always re-fetched on the next read.
pub struct TodoListCache {
    entries: HashMap<ListKey, CachedList>,
    events: UnboundedReceiver<CacheEvent>,
    sender: UnboundedSender<CacheEvent>,
}

impl TodoListCache {
    pub fn new() -> TodoListCache {
        let (sender, events) = mpsc::unbounded_channel();

        TodoListCache {
            entries: HashMap::new(),
            events,
            sender,
        }
    }

    pub fn invalidator(&self) -> Invalidator {
        Invalidator {
            sender: self.sender.clone(),
        }
    }

    /// Marks the list under [key] stale. Does nothing if it was never fetched.
    pub fn invalidate(&mut self, key: &ListKey) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.stale = true;
        }
    }

    fn drain_events(&mut self) {
        while let Ok(CacheEvent::Invalidate(key)) = self.events.try_recv() {
            self.invalidate(&key);
        }
    }

    /// Returns whatever is cached under [key] without fetching, even if it is stale
    pub fn peek(&mut self, key: &ListKey) -> Option<&[dto::Todo]> {
        self.drain_events();
        self.entries.get(key).map(|entry| entry.todos.as_slice())
    }

    pub fn is_stale(&mut self, key: &ListKey) -> bool {
        self.drain_events();
        self.entries.get(key).is_none_or(|entry| entry.stale)
    }

    /// Serves the list under [key], calling getAll first if nothing fresh is cached.
    /// A failed fetch leaves the previous (stale) entry in place.
    pub async fn list(
        &mut self,
        key: &ListKey,
        procedures: &impl TodoProcedures,
    ) -> Result<&[dto::Todo], ProcedureError> {
        if self.is_stale(key) {
            debug!(?key, "fetching todo list");
            let todos = procedures.get_all().await?;
            self.entries.insert(
                key.clone(),
                CachedList {
                    todos,
                    stale: false,
                },
            );
        }

        Ok(self
            .entries
            .get(key)
            .map(|entry| entry.todos.as_slice())
            .unwrap_or_default())
    }
}

impl Default for TodoListCache {
    fn default() -> Self {
        TodoListCache::new()
    }
}
