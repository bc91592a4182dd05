use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::db::db::DBClient;
use crate::dtos::chatdtos::WsServerEvent;

/// Presence entries in Redis expire on their own if a process dies without
/// cleaning up.
const PRESENCE_TTL_SECS: usize = 300;

/// Maps connected users to their websocket send channels. Delivery uses the
/// in-process map; liveness is additionally mirrored to Redis keys
/// (`presence:{user_id}`) when Redis is configured, so other processes and
/// operators can observe who is online and restarts don't leave stale
/// entries behind.
#[derive(Debug, Clone)]
pub struct PresenceRegistry {
    connections: Arc<RwLock<HashMap<Uuid, mpsc::UnboundedSender<WsServerEvent>>>>,
    db_client: Arc<DBClient>,
}

impl PresenceRegistry {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        PresenceRegistry {
            connections: Arc::new(RwLock::new(HashMap::new())),
            db_client,
        }
    }

    pub async fn register(&self, user_id: Uuid, sender: mpsc::UnboundedSender<WsServerEvent>) {
        self.connections.write().await.insert(user_id, sender);
        tracing::info!("User {} registered for chat delivery", user_id);

        if let Some(redis) = &self.db_client.redis_client {
            let key = format!("presence:{}", user_id);
            let mut conn = redis.lock().await;
            let result: Result<(), redis::RedisError> = redis::cmd("SET")
                .arg(&key)
                .arg("online")
                .arg("EX")
                .arg(PRESENCE_TTL_SECS)
                .query_async(&mut *conn)
                .await;
            if let Err(e) = result {
                tracing::warn!("Failed to mirror presence for {} to Redis: {}", user_id, e);
            }
        }
    }

    /// Remove the user's entry only if it still belongs to the disconnecting
    /// session. After a reconnect the map holds the newer socket's sender,
    /// and the old session's teardown must not evict it.
    pub async fn unregister(&self, user_id: Uuid, sender: &mpsc::UnboundedSender<WsServerEvent>) {
        let removed = {
            let mut connections = self.connections.write().await;
            match connections.get(&user_id) {
                Some(current) if current.same_channel(sender) => {
                    connections.remove(&user_id);
                    true
                }
                _ => false,
            }
        };

        if !removed {
            tracing::debug!(
                "Skipping presence cleanup for {}: a newer connection owns the entry",
                user_id
            );
            return;
        }

        tracing::info!("User {} disconnected from chat", user_id);

        if let Some(redis) = &self.db_client.redis_client {
            let key = format!("presence:{}", user_id);
            let mut conn = redis.lock().await;
            let result: Result<(), redis::RedisError> =
                redis::cmd("DEL").arg(&key).query_async(&mut *conn).await;
            if let Err(e) = result {
                tracing::warn!("Failed to clear presence for {} in Redis: {}", user_id, e);
            }
        }
    }

    pub async fn is_online(&self, user_id: Uuid) -> bool {
        self.connections.read().await.contains_key(&user_id)
    }

    /// Forward an event to the user's live connection, if any. Returns false
    /// when the user has no connection (or it just closed); the caller falls
    /// back to persisted history.
    pub async fn send_to(&self, user_id: Uuid, event: WsServerEvent) -> bool {
        let connections = self.connections.read().await;
        match connections.get(&user_id) {
            Some(sender) => sender.send(event).is_ok(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn test_registry() -> PresenceRegistry {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/rentez_test")
            .unwrap();
        PresenceRegistry::new(Arc::new(DBClient::new(pool)))
    }

    #[tokio::test]
    async fn register_and_unregister_round_trip() {
        let registry = test_registry();
        let user_id = Uuid::new_v4();
        let (tx, mut rx) = mpsc::unbounded_channel();

        registry.register(user_id, tx.clone()).await;
        assert!(registry.is_online(user_id).await);
        assert!(
            registry
                .send_to(user_id, WsServerEvent::Registered { user_id })
                .await
        );
        assert!(rx.recv().await.is_some());

        registry.unregister(user_id, &tx).await;
        assert!(!registry.is_online(user_id).await);
    }

    #[tokio::test]
    async fn stale_session_teardown_keeps_the_newer_connection() {
        let registry = test_registry();
        let user_id = Uuid::new_v4();
        let (old_tx, _old_rx) = mpsc::unbounded_channel();
        let (new_tx, mut new_rx) = mpsc::unbounded_channel();

        registry.register(user_id, old_tx.clone()).await;
        registry.register(user_id, new_tx.clone()).await;

        // The replaced session's socket closes after the reconnect.
        registry.unregister(user_id, &old_tx).await;

        assert!(registry.is_online(user_id).await);
        assert!(
            registry
                .send_to(user_id, WsServerEvent::Registered { user_id })
                .await
        );
        assert!(new_rx.recv().await.is_some());

        registry.unregister(user_id, &new_tx).await;
        assert!(!registry.is_online(user_id).await);
    }
}
