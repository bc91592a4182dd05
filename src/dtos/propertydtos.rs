use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::propertymodel::{Property, PropertyStatus, PropertyType};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreatePropertyDto {
    #[validate(length(min = 5, max = 200, message = "Title must be between 5 and 200 characters"))]
    pub title: String,

    #[validate(length(min = 20, max = 2000, message = "Description must be between 20 and 2000 characters"))]
    pub description: String,

    // Address
    #[validate(length(min = 3, max = 255, message = "Street is required"))]
    pub street: String,

    #[validate(length(min = 2, max = 100, message = "City is required"))]
    pub city: String,

    #[validate(length(min = 2, max = 100, message = "State is required"))]
    pub state: String,

    #[validate(length(min = 3, max = 20, message = "Zip code is required"))]
    pub zip_code: String,

    pub country: Option<String>,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude out of range"))]
    pub longitude: f64,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude out of range"))]
    pub latitude: f64,

    // Specifications
    #[validate(range(min = 0, message = "Rent cannot be negative"))]
    pub rent: i64,

    #[validate(range(min = 0, message = "Bedrooms cannot be negative"))]
    pub bedrooms: i32,

    #[validate(range(min = 0, message = "Bathrooms cannot be negative"))]
    pub bathrooms: i32,

    #[validate(range(min = 1, message = "Area is required"))]
    pub area_sqft: i32,

    pub property_type: PropertyType,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub available_from: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdatePropertyDto {
    #[validate(length(min = 5, max = 200, message = "Title must be between 5 and 200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 20, max = 2000, message = "Description must be between 20 and 2000 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 0, message = "Rent cannot be negative"))]
    pub rent: Option<i64>,

    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area_sqft: Option<i32>,
    pub property_type: Option<PropertyType>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub available_from: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct PropertySearchQuery {
    pub city: Option<String>,
    pub min_rent: Option<i64>,
    pub max_rent: Option<i64>,
    pub bedrooms: Option<i32>,
    pub property_type: Option<PropertyType>,
    pub status: Option<PropertyStatus>,
    pub page: Option<u32>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub page: u32,
    pub pages: i64,
}

#[derive(Debug, Serialize)]
pub struct PropertyListResponseDto {
    pub status: String,
    pub data: Vec<Property>,
    pub pagination: Pagination,
}
