use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "property_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    Available,
    Rented,
    Maintenance,
}

impl PropertyStatus {
    pub fn to_str(&self) -> &str {
        match self {
            PropertyStatus::Available => "available",
            PropertyStatus::Rented => "rented",
            PropertyStatus::Maintenance => "maintenance",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "property_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Apartment,
    House,
    Villa,
    Studio,
    Commercial,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Uuid,

    pub title: String,
    pub description: String,

    // Address
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub longitude: f64,
    pub latitude: f64,

    // Specifications
    pub rent: i64,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area_sqft: i32,
    pub property_type: PropertyType,
    pub amenities: JsonValue,
    pub images: JsonValue,

    pub available_from: DateTime<Utc>,
    pub status: PropertyStatus,
    pub current_tenant_id: Option<Uuid>,

    // Review aggregates, maintained by the review handler
    pub average_rating: f64,
    pub total_reviews: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
