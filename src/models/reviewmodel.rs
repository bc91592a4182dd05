use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Review {
    pub id: Uuid,
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub rating: i32,
    pub title: String,
    pub comment: String,
    pub pros: JsonValue,
    pub cons: JsonValue,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
