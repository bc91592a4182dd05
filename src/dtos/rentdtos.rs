use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::rentmodel::{PaymentMethod, PaymentStatus};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateRentPaymentDto {
    pub lease_id: Uuid,

    #[validate(range(min = 0, message = "Amount cannot be negative"))]
    pub amount: i64,

    pub due_date: DateTime<Utc>,

    #[validate(range(min = 1, message = "Month number must be at least 1"))]
    pub month_number: i32,

    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateRentPaymentDto {
    pub status: Option<PaymentStatus>,
    pub payment_date: Option<DateTime<Utc>>,
    pub payment_method: Option<PaymentMethod>,

    #[validate(length(max = 100, message = "Transaction id must be at most 100 characters"))]
    pub transaction_id: Option<String>,

    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum VerifyAction {
    Approve,
    Reject,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct VerifyReceiptDto {
    pub action: VerifyAction,

    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_payment_rejects_negative_amount() {
        let dto = CreateRentPaymentDto {
            lease_id: Uuid::new_v4(),
            amount: -1,
            due_date: Utc::now(),
            month_number: 13,
            notes: None,
        };
        assert!(dto.validate().is_err());

        let dto = CreateRentPaymentDto {
            lease_id: Uuid::new_v4(),
            amount: 150_000,
            due_date: Utc::now(),
            month_number: 13,
            notes: Some("parking fee".to_string()),
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn verify_action_parses_lowercase() {
        let dto: VerifyReceiptDto =
            serde_json::from_str(r#"{"action": "approve"}"#).unwrap();
        assert_eq!(dto.action, VerifyAction::Approve);

        let dto: VerifyReceiptDto =
            serde_json::from_str(r#"{"action": "reject", "notes": "blurry photo"}"#).unwrap();
        assert_eq!(dto.action, VerifyAction::Reject);
        assert_eq!(dto.notes.as_deref(), Some("blurry photo"));
    }
}
