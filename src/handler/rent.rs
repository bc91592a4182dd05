use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{
        leasedb::LeaseExt,
        rentdb::{RentExt, RentPaymentUpdate},
    },
    dtos::rentdtos::{CreateRentPaymentDto, UpdateRentPaymentDto, VerifyAction, VerifyReceiptDto},
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::{
        leasemodel::LeaseStatus,
        rentmodel::{PaymentStatus, ReceiptStatus},
        usermodel::UserRole,
    },
    AppState,
};

const MAX_PROOF_BYTES: usize = 5 * 1024 * 1024;
const ALLOWED_PROOF_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "pdf"];

/// Either party of a payment may record updates against it: the owner when
/// collecting in person, the tenant when reporting their own transfer.
fn is_payment_party(payment: &crate::models::rentmodel::RentPayment, user_id: Uuid) -> bool {
    payment.owner_id == user_id || payment.tenant_id == user_id
}

pub fn rent_handler() -> Router {
    Router::new()
        .route("/", get(get_my_payments).post(create_payment))
        .route("/:payment_id", put(update_payment))
        .route(
            "/:payment_id/upload-proof",
            post(upload_payment_proof).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Tenant])
            })),
        )
        .route(
            "/:payment_id/verify-receipt",
            put(verify_receipt).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Owner])
            })),
        )
}

pub async fn get_my_payments(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let payments = match auth.user.role {
        UserRole::Owner => app_state
            .db_client
            .get_payments_for_owner(auth.user.id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?,
        UserRole::Tenant => app_state
            .db_client
            .get_payments_for_tenant(auth.user.id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?,
    };

    Ok(Json(serde_json::json!({
        "status": "success",
        "results": payments.len(),
        "data": payments,
    })))
}

pub async fn create_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateRentPaymentDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if auth.user.role != UserRole::Owner {
        return Err(HttpError::forbidden(
            "Only owners can create payments".to_string(),
        ));
    }

    let lease = app_state
        .db_client
        .get_lease_by_id(body.lease_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Lease not found".to_string()))?;

    if lease.owner_id != auth.user.id {
        return Err(HttpError::forbidden(
            "You can only bill your own leases".to_string(),
        ));
    }

    if lease.status != LeaseStatus::Active {
        return Err(HttpError::bad_request(
            "Payments can only be added to an active lease".to_string(),
        ));
    }

    let payment = app_state
        .db_client
        .create_payment(
            &lease,
            body.amount,
            body.due_date,
            body.month_number,
            body.notes.unwrap_or_default(),
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "message": "Payment created successfully",
            "data": payment,
        })),
    ))
}

pub async fn update_payment(
    Path(payment_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdateRentPaymentDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let payment = app_state
        .db_client
        .get_payment_by_id(payment_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Payment not found".to_string()))?;

    if !is_payment_party(&payment, auth.user.id) {
        return Err(HttpError::forbidden(
            "You are not a party to this payment".to_string(),
        ));
    }

    if let Some(new_status) = body.status {
        if !payment.status.can_transition_to(new_status) {
            return Err(HttpError::bad_request(format!(
                "A {} payment cannot become {}",
                payment.status.to_str(),
                new_status.to_str()
            )));
        }
    }

    // Recording a payment without an explicit date stamps it now.
    let payment_date = match (body.status, body.payment_date) {
        (Some(PaymentStatus::Paid), None) => Some(chrono::Utc::now()),
        (_, date) => date,
    };

    let updated = app_state
        .db_client
        .update_payment(
            payment_id,
            RentPaymentUpdate {
                status: body.status,
                payment_date,
                payment_method: body.payment_method,
                transaction_id: body.transaction_id,
                notes: body.notes,
            },
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Payment updated successfully",
        "data": updated,
    })))
}

pub async fn upload_payment_proof(
    Path(payment_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    let payment = app_state
        .db_client
        .get_payment_by_id(payment_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Payment not found".to_string()))?;

    if payment.tenant_id != auth.user.id {
        return Err(HttpError::forbidden(
            "You can only upload receipts for your own payments".to_string(),
        ));
    }

    if payment.status.is_terminal() {
        return Err(HttpError::bad_request(
            "This payment is already settled".to_string(),
        ));
    }

    let mut saved_path: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::bad_request(e.to_string()))?
    {
        if field.name() != Some("proof") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("receipt").to_string();
        let extension = FsPath::new(&original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if !ALLOWED_PROOF_EXTENSIONS.contains(&extension.as_str()) {
            return Err(HttpError::bad_request(
                "Receipt must be a jpg, jpeg, png or pdf file".to_string(),
            ));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| HttpError::bad_request(e.to_string()))?;

        if data.is_empty() {
            return Err(HttpError::bad_request("Receipt file is empty".to_string()));
        }
        if data.len() > MAX_PROOF_BYTES {
            return Err(HttpError::bad_request(
                "Receipt file exceeds the 5MB limit".to_string(),
            ));
        }

        let file_name = format!("{}-{}.{}", payment_id, Uuid::new_v4(), extension);
        let file_path = FsPath::new(&app_state.env.upload_dir).join(&file_name);

        tokio::fs::write(&file_path, &data)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;

        saved_path = Some(format!("/uploads/{}", file_name));
        break;
    }

    let proof_path = saved_path
        .ok_or_else(|| HttpError::bad_request("No receipt file provided".to_string()))?;

    let updated = app_state
        .db_client
        .attach_payment_proof(payment_id, &proof_path)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Receipt uploaded and awaiting owner verification",
        "data": updated,
    })))
}

pub async fn verify_receipt(
    Path(payment_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<VerifyReceiptDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let payment = app_state
        .db_client
        .get_payment_by_id(payment_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Payment not found".to_string()))?;

    if payment.owner_id != auth.user.id {
        return Err(HttpError::forbidden(
            "You can only verify receipts for your own properties".to_string(),
        ));
    }

    if payment.verification_status != ReceiptStatus::PendingVerification {
        return Err(HttpError::bad_request(
            "There is no receipt awaiting verification on this payment".to_string(),
        ));
    }

    let notes = body.notes.unwrap_or_default();

    let updated = match body.action {
        VerifyAction::Approve => {
            if !payment.status.can_transition_to(PaymentStatus::Paid) {
                return Err(HttpError::bad_request(format!(
                    "A {} payment cannot be marked paid",
                    payment.status.to_str()
                )));
            }
            app_state
                .db_client
                .approve_receipt(payment_id, auth.user.id, notes)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?
        }
        VerifyAction::Reject => app_state
            .db_client
            .reject_receipt(payment_id, auth.user.id, notes)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?,
    };

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Receipt verification recorded",
        "data": updated,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rentmodel::{PaymentMethod, RentPayment};
    use chrono::Utc;

    fn payment(owner_id: Uuid, tenant_id: Uuid) -> RentPayment {
        RentPayment {
            id: Uuid::new_v4(),
            lease_id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            tenant_id,
            owner_id,
            amount: 150_000,
            due_date: Utc::now(),
            month_number: 1,
            payment_date: None,
            status: PaymentStatus::Pending,
            payment_method: PaymentMethod::Other,
            transaction_id: String::new(),
            notes: String::new(),
            payment_proof: None,
            verification_status: ReceiptStatus::NotSubmitted,
            verification_notes: String::new(),
            verified_by: None,
            verified_at: None,
            last_reminder_sent_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn both_parties_may_update_a_payment() {
        let owner = Uuid::new_v4();
        let tenant = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let payment = payment(owner, tenant);

        assert!(is_payment_party(&payment, owner));
        assert!(is_payment_party(&payment, tenant));
        assert!(!is_payment_party(&payment, stranger));
    }
}
