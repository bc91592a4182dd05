use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

impl PaymentStatus {
    pub fn to_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Overdue => "overdue",
            PaymentStatus::Cancelled => "cancelled",
        }
    }

    /// Paid and cancelled payments never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Paid | PaymentStatus::Cancelled)
    }

    /// Legal transitions: pending -> paid/overdue/cancelled and
    /// overdue -> paid/cancelled. Nothing moves backward.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        match self {
            PaymentStatus::Pending => matches!(
                next,
                PaymentStatus::Paid | PaymentStatus::Overdue | PaymentStatus::Cancelled
            ),
            PaymentStatus::Overdue => {
                matches!(next, PaymentStatus::Paid | PaymentStatus::Cancelled)
            }
            PaymentStatus::Paid | PaymentStatus::Cancelled => false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Upi,
    Card,
    Other,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "receipt_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    NotSubmitted,
    PendingVerification,
    Verified,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct RentPayment {
    pub id: Uuid,
    pub lease_id: Uuid,
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub owner_id: Uuid,
    pub amount: i64,
    pub due_date: DateTime<Utc>,
    pub month_number: i32,
    pub payment_date: Option<DateTime<Utc>>,
    pub status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub transaction_id: String,
    pub notes: String,
    pub payment_proof: Option<String>,
    pub verification_status: ReceiptStatus,
    pub verification_notes: String,
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<DateTime<Utc>>,
    pub last_reminder_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_become_paid_overdue_or_cancelled() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Paid));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Overdue));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Cancelled));
    }

    #[test]
    fn overdue_can_still_be_paid() {
        assert!(PaymentStatus::Overdue.can_transition_to(PaymentStatus::Paid));
        assert!(PaymentStatus::Overdue.can_transition_to(PaymentStatus::Cancelled));
        assert!(!PaymentStatus::Overdue.can_transition_to(PaymentStatus::Pending));
    }

    #[test]
    fn terminal_states_never_move() {
        for next in [
            PaymentStatus::Pending,
            PaymentStatus::Paid,
            PaymentStatus::Overdue,
            PaymentStatus::Cancelled,
        ] {
            assert!(!PaymentStatus::Paid.can_transition_to(next));
            assert!(!PaymentStatus::Cancelled.can_transition_to(next));
        }
        assert!(PaymentStatus::Paid.is_terminal());
        assert!(PaymentStatus::Cancelled.is_terminal());
        assert!(!PaymentStatus::Overdue.is_terminal());
    }
}
