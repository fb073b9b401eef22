//! Registry of sessions currently driven by a live connection

use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

use crate::util::time::unix_millis;

/// Bookkeeping for one live session
#[derive(Debug, Clone, Copy)]
pub struct LiveSession {
    pub connected_at: u64,
}

/// Live session ids. Only used for bookkeeping; no game state lives here.
pub struct SessionRegistry {
    sessions: DashMap<Uuid, LiveSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Mark `id` live. Returns false if another connection already drives it.
    pub fn claim(&self, id: Uuid) -> bool {
        match self.sessions.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(LiveSession {
                    connected_at: unix_millis(),
                });
                true
            }
        }
    }

    pub fn release(&self, id: Uuid) -> Option<LiveSession> {
        self.sessions.remove(&id).map(|(_, s)| s)
    }

    pub fn is_live(&self, id: &Uuid) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_is_exclusive() {
        let registry = SessionRegistry::new();
        let id = Uuid::new_v4();

        assert!(registry.claim(id));
        assert!(!registry.claim(id));
        assert_eq!(registry.active_sessions(), 1);

        assert!(registry.release(id).is_some());
        assert!(!registry.is_live(&id));
        assert!(registry.claim(id));
    }
}
