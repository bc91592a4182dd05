use redis::aio::ConnectionManager;
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct DBClient {
    pub pool: Pool<Postgres>,
    pub redis_client: Option<Arc<Mutex<ConnectionManager>>>,
}

impl std::fmt::Debug for DBClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DBClient")
            .field("pool", &"Pool<Postgres>")
            .field("redis_client", &self.redis_client.is_some())
            .finish()
    }
}

impl DBClient {
    /// Create a new DBClient with PostgreSQL pool only
    pub fn new(pool: Pool<Postgres>) -> Self {
        DBClient {
            pool,
            redis_client: None,
        }
    }

    /// Create a new DBClient with both PostgreSQL and Redis
    pub async fn with_redis(pool: Pool<Postgres>, redis_url: &str) -> Self {
        match redis::Client::open(redis_url) {
            Ok(client) => match ConnectionManager::new(client).await {
                Ok(conn) => {
                    tracing::info!("✅ Redis connection established successfully");
                    DBClient {
                        pool,
                        redis_client: Some(Arc::new(Mutex::new(conn))),
                    }
                }
                Err(e) => {
                    tracing::warn!("⚠️ Failed to connect to Redis: {}. Continuing without it.", e);
                    DBClient {
                        pool,
                        redis_client: None,
                    }
                }
            },
            Err(e) => {
                tracing::warn!("⚠️ Failed to create Redis client: {}. Continuing without it.", e);
                DBClient {
                    pool,
                    redis_client: None,
                }
            }
        }
    }

    pub fn is_redis_available(&self) -> bool {
        self.redis_client.is_some()
    }
}
