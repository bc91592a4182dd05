use std::sync::Arc;

use axum::{
    extract::Path,
    middleware,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{
        applicationdb::ApplicationExt,
        leasedb::{LeaseExt, NewLease},
        propertydb::PropertyExt,
        userdb::UserExt,
    },
    dtos::leasedtos::CreateLeaseDto,
    error::HttpError,
    mail::mails::send_lease_created_email,
    middleware::{role_check, JWTAuthMiddeware},
    models::{
        applicationmodel::ApplicationStatus,
        leasemodel::LeaseStatus,
        usermodel::UserRole,
    },
    service::rent_schedule::{build_schedule, lease_end_date},
    AppState,
};

pub fn lease_handler() -> Router {
    Router::new()
        .route("/", get(get_my_leases).post(create_lease))
        .route("/:lease_id", get(get_lease))
        .route(
            "/:lease_id/terminate",
            put(terminate_lease).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Owner])
            })),
        )
}

pub async fn create_lease(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateLeaseDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if auth.user.role != UserRole::Owner {
        return Err(HttpError::forbidden(
            "Only owners can create leases".to_string(),
        ));
    }

    let application = app_state
        .db_client
        .get_application_by_id(body.application_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Application not found".to_string()))?;

    if application.owner_id != auth.user.id {
        return Err(HttpError::forbidden(
            "You can only create leases for your own properties".to_string(),
        ));
    }

    if application.status != ApplicationStatus::Approved {
        return Err(HttpError::bad_request(
            "A lease can only be created from an approved application".to_string(),
        ));
    }

    let existing_lease = app_state
        .db_client
        .get_active_lease_by_application(body.application_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if existing_lease.is_some() {
        return Err(HttpError::bad_request(
            "A lease already exists for this application".to_string(),
        ));
    }

    let property = app_state
        .db_client
        .get_property_by_id(application.property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Property not found".to_string()))?;

    let start_date = application.move_in_date;
    let end_date = lease_end_date(start_date, application.lease_duration_months)
        .ok_or_else(|| HttpError::bad_request("Invalid lease duration".to_string()))?;

    let schedule = build_schedule(start_date, end_date, property.rent);
    if schedule.is_empty() {
        return Err(HttpError::bad_request(
            "Lease dates produce no payable months".to_string(),
        ));
    }

    let lease = app_state
        .db_client
        .create_lease_with_payments(
            NewLease {
                property_id: application.property_id,
                tenant_id: application.tenant_id,
                owner_id: application.owner_id,
                application_id: application.id,
                start_date,
                end_date,
                monthly_rent: property.rent,
                security_deposit: body.security_deposit,
                terms: body.terms,
            },
            schedule,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let tenant = app_state
        .db_client
        .get_user(Some(lease.tenant_id), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if let Some(tenant) = tenant {
        let state = app_state.clone();
        let property_title = property.title.clone();
        let lease_copy = lease.clone();
        tokio::spawn(async move {
            if let Err(e) =
                send_lease_created_email(&state.env, &tenant, &property_title, &lease_copy).await
            {
                tracing::warn!("Failed to send lease created email: {}", e);
            }
        });
    }

    Ok((
        axum::http::StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "message": "Lease created with its full rent schedule",
            "data": lease,
        })),
    ))
}

pub async fn get_my_leases(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let leases = match auth.user.role {
        UserRole::Owner => app_state
            .db_client
            .get_active_leases_for_owner(auth.user.id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?,
        UserRole::Tenant => app_state
            .db_client
            .get_active_leases_for_tenant(auth.user.id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?,
    };

    Ok(Json(serde_json::json!({
        "status": "success",
        "results": leases.len(),
        "data": leases,
    })))
}

pub async fn get_lease(
    Path(lease_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let lease = app_state
        .db_client
        .get_lease_by_id(lease_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Lease not found".to_string()))?;

    if lease.owner_id != auth.user.id && lease.tenant_id != auth.user.id {
        return Err(HttpError::forbidden(
            "You are not a party to this lease".to_string(),
        ));
    }

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": lease,
    })))
}

pub async fn terminate_lease(
    Path(lease_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let lease = app_state
        .db_client
        .get_lease_by_id(lease_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Lease not found".to_string()))?;

    if lease.owner_id != auth.user.id {
        return Err(HttpError::forbidden(
            "You can only terminate your own leases".to_string(),
        ));
    }

    if lease.status != LeaseStatus::Active {
        return Err(HttpError::bad_request(
            "Only an active lease can be terminated".to_string(),
        ));
    }

    let terminated = app_state
        .db_client
        .terminate_lease(lease_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Lease terminated; pending payments cancelled and property relisted",
        "data": terminated,
    })))
}
