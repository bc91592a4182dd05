use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::propertydb::{PropertyExt, PropertySearchFilters},
    dtos::propertydtos::{
        CreatePropertyDto, Pagination, PropertyListResponseDto, PropertySearchQuery,
        UpdatePropertyDto,
    },
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::{propertymodel::PropertyStatus, usermodel::UserRole},
    AppState,
};

const MAX_PAGE_SIZE: usize = 50;

pub fn property_handler() -> Router {
    let protected = Router::new()
        .route(
            "/",
            post(create_property).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Owner])
            })),
        )
        .route(
            "/my-properties",
            get(get_my_properties).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Owner])
            })),
        )
        .route(
            "/:property_id",
            put(update_property)
                .delete(delete_property)
                .layer(middleware::from_fn(|req, next| {
                    role_check(req, next, vec![UserRole::Owner])
                })),
        )
        .layer(middleware::from_fn(crate::middleware::auth));

    let public = Router::new()
        .route("/", get(search_properties))
        .route("/:property_id", get(get_property));

    Router::new().merge(protected).merge(public)
}

pub async fn search_properties(
    Query(query): Query<PropertySearchQuery>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, MAX_PAGE_SIZE);

    let filters = PropertySearchFilters {
        city: query.city,
        min_rent: query.min_rent,
        max_rent: query.max_rent,
        bedrooms: query.bedrooms,
        property_type: query.property_type,
        status: query.status,
    };

    let (properties, total) = app_state
        .db_client
        .get_properties(filters, page, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let pages = (total + limit as i64 - 1) / limit as i64;

    Ok(Json(PropertyListResponseDto {
        status: "success".to_string(),
        data: properties,
        pagination: Pagination { total, page, pages },
    }))
}

pub async fn get_property(
    Path(property_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let property = app_state
        .db_client
        .get_property_by_id(property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Property not found".to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": property,
    })))
}

pub async fn create_property(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreatePropertyDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let property = app_state
        .db_client
        .create_property(auth.user.id, body)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "message": "Property listed successfully",
            "data": property,
        })),
    ))
}

pub async fn get_my_properties(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let properties = app_state
        .db_client
        .get_properties_by_owner(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "results": properties.len(),
        "data": properties,
    })))
}

pub async fn update_property(
    Path(property_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdatePropertyDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let property = app_state
        .db_client
        .get_property_by_id(property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Property not found".to_string()))?;

    if property.owner_id != auth.user.id {
        return Err(HttpError::forbidden(
            "You can only update your own properties".to_string(),
        ));
    }

    let updated = app_state
        .db_client
        .update_property(property_id, body)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Property updated successfully",
        "data": updated,
    })))
}

/// A property with a sitting tenant stays on the books until the lease
/// is terminated and the unit is released.
fn is_deletable(property: &crate::models::propertymodel::Property) -> bool {
    property.status != PropertyStatus::Rented
}

pub async fn delete_property(
    Path(property_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let property = app_state
        .db_client
        .get_property_by_id(property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Property not found".to_string()))?;

    if property.owner_id != auth.user.id {
        return Err(HttpError::forbidden(
            "You can only delete your own properties".to_string(),
        ));
    }

    if !is_deletable(&property) {
        return Err(HttpError::bad_request(
            "A rented property cannot be deleted".to_string(),
        ));
    }

    match app_state.db_client.delete_property(property_id).await {
        Ok(()) => Ok(Json(serde_json::json!({
            "status": "success",
            "message": "Property deleted successfully",
        }))),
        Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
            Err(HttpError::bad_request(
                "This property has rental history and cannot be deleted".to_string(),
            ))
        }
        Err(e) => Err(HttpError::server_error(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::propertymodel::{Property, PropertyType};
    use chrono::Utc;

    fn property(status: PropertyStatus) -> Property {
        Property {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "2BHK near the metro".to_string(),
            description: "Bright second-floor flat".to_string(),
            street: "14 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            zip_code: "560001".to_string(),
            country: "India".to_string(),
            longitude: 77.6,
            latitude: 12.97,
            rent: 2_500_000,
            bedrooms: 2,
            bathrooms: 2,
            area_sqft: 950,
            property_type: PropertyType::Apartment,
            amenities: serde_json::json!(["parking"]),
            images: serde_json::json!([]),
            available_from: Utc::now(),
            status,
            current_tenant_id: None,
            average_rating: 0.0,
            total_reviews: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn rented_properties_cannot_be_deleted() {
        assert!(is_deletable(&property(PropertyStatus::Available)));
        assert!(is_deletable(&property(PropertyStatus::Maintenance)));
        assert!(!is_deletable(&property(PropertyStatus::Rented)));
    }
}
