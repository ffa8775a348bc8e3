use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::types::WsMessage;

pub type WsSender = mpsc::UnboundedSender<WsMessage>;

/// A registered live connection. The connection id tells a stale socket's
/// disconnect apart from the entry that replaced it.
#[derive(Clone)]
pub struct PresenceEntry {
    pub connection_id: Uuid,
    pub sender: WsSender,
}

/// In-memory map of which users are reachable over a live connection right
/// now. Process-lifetime state only; at most one entry per user.
#[derive(Clone)]
pub struct PresenceRegistry {
    entries: Arc<DashMap<Uuid, PresenceEntry>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Register a connection for a user, replacing any existing one. The
    /// replaced socket is not closed; it is simply no longer reachable here.
    pub fn register(&self, user_id: Uuid, entry: PresenceEntry) {
        self.entries.insert(user_id, entry);
        tracing::info!("User {} connected via WebSocket", user_id);
    }

    /// Remove the mapping only if the stored connection id matches, so a
    /// stale disconnect cannot evict a newer connection for the same user.
    pub fn unregister(&self, user_id: Uuid, connection_id: Uuid) {
        let removed = self
            .entries
            .remove_if(&user_id, |_, entry| entry.connection_id == connection_id);
        if removed.is_some() {
            tracing::info!("User {} disconnected from WebSocket", user_id);
        }
    }

    pub fn lookup(&self, user_id: Uuid) -> Option<WsSender> {
        self.entries.get(&user_id).map(|entry| entry.sender.clone())
    }

    pub fn is_online(&self, user_id: Uuid) -> bool {
        self.entries.contains_key(&user_id)
    }

    pub fn online_count(&self) -> usize {
        self.entries.len()
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::types::ErrorPayload;

    fn entry() -> (PresenceEntry, mpsc::UnboundedReceiver<WsMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            PresenceEntry {
                connection_id: Uuid::new_v4(),
                sender: tx,
            },
            rx,
        )
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = PresenceRegistry::new();
        let user = Uuid::new_v4();
        assert!(!registry.is_online(user));
        assert!(registry.lookup(user).is_none());

        let (e, _rx) = entry();
        registry.register(user, e);
        assert!(registry.is_online(user));
        assert!(registry.lookup(user).is_some());
        assert_eq!(registry.online_count(), 1);
    }

    #[test]
    fn test_register_replaces_previous_connection() {
        let registry = PresenceRegistry::new();
        let user = Uuid::new_v4();
        let (old, _old_rx) = entry();
        let (new, mut new_rx) = entry();
        let new_id = new.connection_id;

        registry.register(user, old);
        registry.register(user, new);
        assert_eq!(registry.online_count(), 1);

        // frames flow to the replacement connection
        registry
            .lookup(user)
            .unwrap()
            .send(WsMessage::Error(ErrorPayload {
                message: "ping".to_string(),
            }))
            .unwrap();
        assert!(new_rx.try_recv().is_ok());

        registry.unregister(user, new_id);
        assert!(!registry.is_online(user));
    }

    #[test]
    fn test_stale_unregister_is_a_noop() {
        let registry = PresenceRegistry::new();
        let user = Uuid::new_v4();
        let (old, _old_rx) = entry();
        let old_id = old.connection_id;
        let (new, _new_rx) = entry();

        registry.register(user, old);
        registry.register(user, new);

        // the old socket closing must not evict the newer registration
        registry.unregister(user, old_id);
        assert!(registry.is_online(user));
    }

    #[test]
    fn test_unregister_unknown_user_is_a_noop() {
        let registry = PresenceRegistry::new();
        registry.unregister(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(registry.online_count(), 0);
    }
}
