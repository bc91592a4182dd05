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
    db::{
        applicationdb::ApplicationExt,
        propertydb::PropertyExt,
        userdb::UserExt,
    },
    dtos::applicationdtos::{
        ApplicationFilterQuery, CreateApplicationDto, UpdateApplicationStatusDto,
    },
    error::HttpError,
    mail::mails::send_application_status_email,
    middleware::{role_check, JWTAuthMiddeware},
    models::{
        applicationmodel::ApplicationStatus,
        propertymodel::PropertyStatus,
        usermodel::UserRole,
    },
    AppState,
};

pub fn application_handler() -> Router {
    Router::new()
        .route(
            "/",
            post(create_application).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Tenant])
            })),
        )
        .route(
            "/my-applications",
            get(get_my_applications).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Tenant])
            })),
        )
        .route(
            "/received",
            get(get_received_applications).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Owner])
            })),
        )
        .route(
            "/property/:property_id",
            get(get_property_applications).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Owner])
            })),
        )
        .route(
            "/:application_id/status",
            put(update_application_status).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Owner])
            })),
        )
}

pub async fn create_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateApplicationDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let property = app_state
        .db_client
        .get_property_by_id(body.property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Property not found".to_string()))?;

    if property.status != PropertyStatus::Available {
        return Err(HttpError::bad_request(
            "This property is not available for rent".to_string(),
        ));
    }

    let existing = app_state
        .db_client
        .get_live_application(body.property_id, auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if existing.is_some() {
        return Err(HttpError::bad_request(
            "You already have an active application for this property".to_string(),
        ));
    }

    let application = app_state
        .db_client
        .create_application(
            body.property_id,
            auth.user.id,
            property.owner_id,
            body.message,
            body.move_in_date,
            body.lease_duration_months,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "message": "Application submitted successfully",
            "data": application,
        })),
    ))
}

pub async fn get_my_applications(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let applications = app_state
        .db_client
        .get_applications_by_tenant(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "results": applications.len(),
        "data": applications,
    })))
}

pub async fn get_received_applications(
    Query(query): Query<ApplicationFilterQuery>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let applications = app_state
        .db_client
        .get_applications_by_owner(auth.user.id, query.status)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "results": applications.len(),
        "data": applications,
    })))
}

pub async fn get_property_applications(
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
            "You can only view applications for your own properties".to_string(),
        ));
    }

    let applications = app_state
        .db_client
        .get_applications_by_property(property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "results": applications.len(),
        "data": applications,
    })))
}

pub async fn update_application_status(
    Path(application_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdateApplicationStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if body.status == ApplicationStatus::Pending {
        return Err(HttpError::bad_request(
            "An application can only be approved or rejected".to_string(),
        ));
    }

    let application = app_state
        .db_client
        .get_application_by_id(application_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Application not found".to_string()))?;

    if application.owner_id != auth.user.id {
        return Err(HttpError::forbidden(
            "You can only decide applications for your own properties".to_string(),
        ));
    }

    if application.status != ApplicationStatus::Pending {
        return Err(HttpError::bad_request(
            "This application has already been decided".to_string(),
        ));
    }

    let rejection_reason = match body.status {
        ApplicationStatus::Rejected => body.rejection_reason.clone(),
        _ => None,
    };

    let updated = app_state
        .db_client
        .update_application_status(application_id, body.status, rejection_reason)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    // Notify the tenant; the decision stands even if the email fails.
    let tenant = app_state
        .db_client
        .get_user(Some(updated.tenant_id), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if let Some(tenant) = tenant {
        let property_title = app_state
            .db_client
            .get_property_by_id(updated.property_id)
            .await
            .ok()
            .flatten()
            .map(|p| p.title)
            .unwrap_or_else(|| "your property".to_string());

        let state = app_state.clone();
        let status = updated.status;
        let reason = updated.rejection_reason.clone();
        tokio::spawn(async move {
            if let Err(e) = send_application_status_email(
                &state.env,
                &tenant,
                &property_title,
                &status,
                reason.as_deref(),
            )
            .await
            {
                tracing::warn!("Failed to send application status email: {}", e);
            }
        });
    }

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Application updated successfully",
        "data": updated,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Conflicting paths panic when the router is built.
    #[test]
    fn routes_register_without_conflicts() {
        let _ = application_handler();
    }
}
