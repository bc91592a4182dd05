use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{leasedb::LeaseExt, propertydb::PropertyExt, reviewdb::ReviewExt},
    dtos::reviewdtos::{CreateReviewDto, ReviewListQuery},
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::usermodel::UserRole,
    AppState,
};

const MAX_PAGE_SIZE: usize = 50;

pub fn review_handler() -> Router {
    let protected = Router::new()
        .route(
            "/",
            post(create_review).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Tenant])
            })),
        )
        .layer(middleware::from_fn(crate::middleware::auth));

    let public = Router::new().route("/property/:property_id", get(get_property_reviews));

    Router::new().merge(protected).merge(public)
}

pub async fn create_review(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateReviewDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let property = app_state
        .db_client
        .get_property_by_id(body.property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Property not found".to_string()))?;

    let qualifying_lease = app_state
        .db_client
        .get_qualifying_lease(auth.user.id, property.id, Utc::now())
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if qualifying_lease.is_none() {
        return Err(HttpError::forbidden(
            "Only tenants who have lived in this property can review it".to_string(),
        ));
    }

    let existing = app_state
        .db_client
        .get_review_by_tenant_and_property(auth.user.id, property.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if existing.is_some() {
        return Err(HttpError::bad_request(
            "You have already reviewed this property".to_string(),
        ));
    }

    let review = app_state
        .db_client
        .create_review(auth.user.id, body)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let (average_rating, total_reviews) = app_state
        .db_client
        .get_rating_summary(property.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    app_state
        .db_client
        .update_review_aggregates(property.id, average_rating, total_reviews as i32)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "message": "Review posted successfully",
            "data": review,
        })),
    ))
}

pub async fn get_property_reviews(
    Path(property_id): Path<Uuid>,
    Query(query): Query<ReviewListQuery>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, MAX_PAGE_SIZE);
    let offset = (page as i64 - 1) * limit as i64;

    if let Some(rating) = query.rating {
        if !(1..=5).contains(&rating) {
            return Err(HttpError::bad_request(
                "Rating filter must be between 1 and 5".to_string(),
            ));
        }
    }

    let reviews = app_state
        .db_client
        .get_reviews_for_property(property_id, query.rating, limit as i64, offset)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let (average_rating, total_reviews) = app_state
        .db_client
        .get_rating_summary(property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "results": reviews.len(),
        "summary": {
            "average_rating": average_rating,
            "total_reviews": total_reviews,
        },
        "data": reviews,
    })))
}
