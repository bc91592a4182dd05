use async_trait::async_trait;
use serde_json::json;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::dtos::reviewdtos::CreateReviewDto;
use crate::models::reviewmodel::Review;

const REVIEW_COLUMNS: &str = r#"
    id, property_id, tenant_id, rating, title, comment, pros, cons, verified,
    created_at, updated_at
"#;

#[async_trait]
pub trait ReviewExt {
    async fn create_review(
        &self,
        tenant_id: Uuid,
        data: CreateReviewDto,
    ) -> Result<Review, Error>;

    async fn get_review_by_tenant_and_property(
        &self,
        tenant_id: Uuid,
        property_id: Uuid,
    ) -> Result<Option<Review>, Error>;

    async fn get_reviews_for_property(
        &self,
        property_id: Uuid,
        rating: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, Error>;

    /// Average rating and count across every review of the property.
    async fn get_rating_summary(&self, property_id: Uuid) -> Result<(f64, i64), Error>;
}

#[async_trait]
impl ReviewExt for DBClient {
    async fn create_review(
        &self,
        tenant_id: Uuid,
        data: CreateReviewDto,
    ) -> Result<Review, Error> {
        sqlx::query_as::<_, Review>(&format!(
            r#"
            INSERT INTO reviews (property_id, tenant_id, rating, title, comment, pros, cons, verified)
            VALUES ($1, $2, $3, $4, $5, $6, $7, true)
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(data.property_id)
        .bind(tenant_id)
        .bind(data.rating)
        .bind(data.title)
        .bind(data.comment)
        .bind(json!(data.pros.unwrap_or_default()))
        .bind(json!(data.cons.unwrap_or_default()))
        .fetch_one(&self.pool)
        .await
    }

    async fn get_review_by_tenant_and_property(
        &self,
        tenant_id: Uuid,
        property_id: Uuid,
    ) -> Result<Option<Review>, Error> {
        sqlx::query_as::<_, Review>(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM reviews
            WHERE tenant_id = $1
              AND property_id = $2
            "#
        ))
        .bind(tenant_id)
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_reviews_for_property(
        &self,
        property_id: Uuid,
        rating: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, Error> {
        sqlx::query_as::<_, Review>(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM reviews
            WHERE property_id = $1
              AND ($2::int IS NULL OR rating = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(property_id)
        .bind(rating)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_rating_summary(&self, property_id: Uuid) -> Result<(f64, i64), Error> {
        let row = sqlx::query_as::<_, (Option<f64>, i64)>(
            r#"
            SELECT AVG(rating)::double precision, COUNT(*)
            FROM reviews
            WHERE property_id = $1
            "#,
        )
        .bind(property_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((row.0.unwrap_or(0.0), row.1))
    }
}
