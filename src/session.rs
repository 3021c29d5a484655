use crate::store::SessionStore;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "reading_log_session";

struct SessionEntry {
    store: SessionStore,
    last_seen: Instant,
}

/// Owns one store per browser session. Stores are never shared between ids.
pub struct SessionRegistry {
    sessions: HashMap<Uuid, SessionEntry>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns the store for `id`, creating a fresh session when the id is
    /// missing or no longer known. The returned id is the one to hand back
    /// to the client.
    pub fn session(&mut self, id: Option<Uuid>, now: Instant) -> (Uuid, &mut SessionStore) {
        self.prune(now);

        let id = match id {
            Some(id) if self.sessions.contains_key(&id) => id,
            _ => Uuid::new_v4(),
        };

        let entry = self.sessions.entry(id).or_insert_with(|| {
            info!(session = %id, "new session");
            SessionEntry {
                store: SessionStore::new(),
                last_seen: now,
            }
        });
        entry.last_seen = now;
        (id, &mut entry.store)
    }

    /// Returns the store for a known, live session without creating one.
    pub fn existing(&mut self, id: Option<Uuid>, now: Instant) -> Option<&mut SessionStore> {
        self.prune(now);
        let entry = self.sessions.get_mut(&id?)?;
        entry.last_seen = now;
        Some(&mut entry.store)
    }

    pub fn prune(&mut self, now: Instant) {
        let ttl = self.ttl;
        let before = self.sessions.len();
        self.sessions
            .retain(|_, entry| now.saturating_duration_since(entry.last_seen) <= ttl);
        let removed = before - self.sessions.len();
        if removed > 0 {
            debug!(removed, "pruned idle sessions");
        }
    }
}
