use async_trait::async_trait;
use serde_json::json;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::dtos::propertydtos::{CreatePropertyDto, UpdatePropertyDto};
use crate::models::propertymodel::{Property, PropertyStatus, PropertyType};

const PROPERTY_COLUMNS: &str = r#"
    id, owner_id, title, description, street, city, state, zip_code, country,
    longitude, latitude, rent, bedrooms, bathrooms, area_sqft, property_type,
    amenities, images, available_from, status, current_tenant_id,
    average_rating, total_reviews, created_at, updated_at
"#;

#[derive(Debug, Default)]
pub struct PropertySearchFilters {
    pub city: Option<String>,
    pub min_rent: Option<i64>,
    pub max_rent: Option<i64>,
    pub bedrooms: Option<i32>,
    pub property_type: Option<PropertyType>,
    pub status: Option<PropertyStatus>,
}

#[async_trait]
pub trait PropertyExt {
    async fn create_property(
        &self,
        owner_id: Uuid,
        data: CreatePropertyDto,
    ) -> Result<Property, Error>;

    async fn get_property_by_id(&self, property_id: Uuid) -> Result<Option<Property>, Error>;

    async fn get_properties(
        &self,
        filters: PropertySearchFilters,
        page: u32,
        limit: usize,
    ) -> Result<(Vec<Property>, i64), Error>;

    async fn get_properties_by_owner(&self, owner_id: Uuid) -> Result<Vec<Property>, Error>;

    async fn update_property(
        &self,
        property_id: Uuid,
        data: UpdatePropertyDto,
    ) -> Result<Property, Error>;

    async fn update_review_aggregates(
        &self,
        property_id: Uuid,
        average_rating: f64,
        total_reviews: i32,
    ) -> Result<(), Error>;

    async fn delete_property(&self, property_id: Uuid) -> Result<(), Error>;
}

#[async_trait]
impl PropertyExt for DBClient {
    async fn create_property(
        &self,
        owner_id: Uuid,
        data: CreatePropertyDto,
    ) -> Result<Property, Error> {
        let amenities = json!(data.amenities.unwrap_or_default());
        let images = json!(data.images.unwrap_or_default());

        sqlx::query_as::<_, Property>(&format!(
            r#"
            INSERT INTO properties
                (owner_id, title, description, street, city, state, zip_code, country,
                 longitude, latitude, rent, bedrooms, bathrooms, area_sqft,
                 property_type, amenities, images, available_from)
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 'India'),
                    $9, $10, $11, $12, $13, $14, $15, $16, $17, COALESCE($18, NOW()))
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.street)
        .bind(data.city)
        .bind(data.state)
        .bind(data.zip_code)
        .bind(data.country)
        .bind(data.longitude)
        .bind(data.latitude)
        .bind(data.rent)
        .bind(data.bedrooms)
        .bind(data.bathrooms)
        .bind(data.area_sqft)
        .bind(data.property_type)
        .bind(amenities)
        .bind(images)
        .bind(data.available_from)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_property_by_id(&self, property_id: Uuid) -> Result<Option<Property>, Error> {
        sqlx::query_as::<_, Property>(&format!(
            r#"
            SELECT {PROPERTY_COLUMNS}
            FROM properties
            WHERE id = $1
            "#
        ))
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_properties(
        &self,
        filters: PropertySearchFilters,
        page: u32,
        limit: usize,
    ) -> Result<(Vec<Property>, i64), Error> {
        let offset = (page.saturating_sub(1) as i64) * limit as i64;
        // Public browsing defaults to available listings
        let status = filters.status.unwrap_or(PropertyStatus::Available);

        let properties = sqlx::query_as::<_, Property>(&format!(
            r#"
            SELECT {PROPERTY_COLUMNS}
            FROM properties
            WHERE status = $1
              AND ($2::text IS NULL OR city ILIKE $2)
              AND ($3::bigint IS NULL OR rent >= $3)
              AND ($4::bigint IS NULL OR rent <= $4)
              AND ($5::int IS NULL OR bedrooms = $5)
              AND ($6::property_type IS NULL OR property_type = $6)
            ORDER BY created_at DESC
            LIMIT $7 OFFSET $8
            "#
        ))
        .bind(status)
        .bind(filters.city.as_ref().map(|c| format!("%{}%", c)))
        .bind(filters.min_rent)
        .bind(filters.max_rent)
        .bind(filters.bedrooms)
        .bind(filters.property_type)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM properties
            WHERE status = $1
              AND ($2::text IS NULL OR city ILIKE $2)
              AND ($3::bigint IS NULL OR rent >= $3)
              AND ($4::bigint IS NULL OR rent <= $4)
              AND ($5::int IS NULL OR bedrooms = $5)
              AND ($6::property_type IS NULL OR property_type = $6)
            "#,
        )
        .bind(status)
        .bind(filters.city.as_ref().map(|c| format!("%{}%", c)))
        .bind(filters.min_rent)
        .bind(filters.max_rent)
        .bind(filters.bedrooms)
        .bind(filters.property_type)
        .fetch_one(&self.pool)
        .await?;

        Ok((properties, total))
    }

    async fn get_properties_by_owner(&self, owner_id: Uuid) -> Result<Vec<Property>, Error> {
        sqlx::query_as::<_, Property>(&format!(
            r#"
            SELECT {PROPERTY_COLUMNS}
            FROM properties
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_property(
        &self,
        property_id: Uuid,
        data: UpdatePropertyDto,
    ) -> Result<Property, Error> {
        // Status and current_tenant_id are deliberately not updatable here;
        // they only move through lease creation/termination.
        sqlx::query_as::<_, Property>(&format!(
            r#"
            UPDATE properties
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                rent = COALESCE($4, rent),
                bedrooms = COALESCE($5, bedrooms),
                bathrooms = COALESCE($6, bathrooms),
                area_sqft = COALESCE($7, area_sqft),
                property_type = COALESCE($8, property_type),
                amenities = COALESCE($9, amenities),
                images = COALESCE($10, images),
                available_from = COALESCE($11, available_from),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(property_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.rent)
        .bind(data.bedrooms)
        .bind(data.bathrooms)
        .bind(data.area_sqft)
        .bind(data.property_type)
        .bind(data.amenities.map(|a| json!(a)))
        .bind(data.images.map(|i| json!(i)))
        .bind(data.available_from)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_review_aggregates(
        &self,
        property_id: Uuid,
        average_rating: f64,
        total_reviews: i32,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE properties
            SET average_rating = $2, total_reviews = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(property_id)
        .bind(average_rating)
        .bind(total_reviews)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_property(&self, property_id: Uuid) -> Result<(), Error> {
        sqlx::query(
            r#"
            DELETE FROM properties
            WHERE id = $1
            "#,
        )
        .bind(property_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
