use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::leasemodel::Lease;
use crate::models::rentmodel::{PaymentMethod, PaymentStatus, ReceiptStatus, RentPayment};

const PAYMENT_COLUMNS: &str = r#"
    id, lease_id, property_id, tenant_id, owner_id, amount, due_date,
    month_number, payment_date, status, payment_method, transaction_id, notes,
    payment_proof, verification_status, verification_notes, verified_by,
    verified_at, last_reminder_sent_at, created_at, updated_at
"#;

pub struct RentPaymentUpdate {
    pub status: Option<PaymentStatus>,
    pub payment_date: Option<DateTime<Utc>>,
    pub payment_method: Option<PaymentMethod>,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
}

#[async_trait]
pub trait RentExt {
    /// One-off payment outside the generated schedule, e.g. a fee the owner
    /// bills mid-lease.
    async fn create_payment(
        &self,
        lease: &Lease,
        amount: i64,
        due_date: DateTime<Utc>,
        month_number: i32,
        notes: String,
    ) -> Result<RentPayment, Error>;

    async fn get_payment_by_id(&self, payment_id: Uuid) -> Result<Option<RentPayment>, Error>;

    async fn get_payments_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<RentPayment>, Error>;

    async fn get_payments_for_owner(&self, owner_id: Uuid) -> Result<Vec<RentPayment>, Error>;

    async fn update_payment(
        &self,
        payment_id: Uuid,
        update: RentPaymentUpdate,
    ) -> Result<RentPayment, Error>;

    async fn attach_payment_proof(
        &self,
        payment_id: Uuid,
        proof_path: &str,
    ) -> Result<RentPayment, Error>;

    /// Owner approval: verified + paid + payment date in one UPDATE so a
    /// concurrent reader never observes verified-but-unpaid.
    async fn approve_receipt(
        &self,
        payment_id: Uuid,
        verified_by: Uuid,
        notes: String,
    ) -> Result<RentPayment, Error>;

    async fn reject_receipt(
        &self,
        payment_id: Uuid,
        verified_by: Uuid,
        notes: String,
    ) -> Result<RentPayment, Error>;

    /// Daily sweep: pending payments past their due date become overdue.
    /// Returns the number of rows flipped.
    async fn mark_overdue_payments(&self, now: DateTime<Utc>) -> Result<u64, Error>;

    /// Reminder sweep candidates: pending/overdue payments due inside the
    /// window whose last reminder is absent or older than the window start.
    async fn get_payments_needing_reminder(
        &self,
        now: DateTime<Utc>,
        due_before: DateTime<Utc>,
        reminded_before: DateTime<Utc>,
    ) -> Result<Vec<RentPayment>, Error>;

    async fn stamp_reminder_sent(
        &self,
        payment_id: Uuid,
        sent_at: DateTime<Utc>,
    ) -> Result<(), Error>;
}

#[async_trait]
impl RentExt for DBClient {
    async fn create_payment(
        &self,
        lease: &Lease,
        amount: i64,
        due_date: DateTime<Utc>,
        month_number: i32,
        notes: String,
    ) -> Result<RentPayment, Error> {
        sqlx::query_as::<_, RentPayment>(&format!(
            r#"
            INSERT INTO rent_payments
                (lease_id, property_id, tenant_id, owner_id, amount,
                 due_date, month_number, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(lease.id)
        .bind(lease.property_id)
        .bind(lease.tenant_id)
        .bind(lease.owner_id)
        .bind(amount)
        .bind(due_date)
        .bind(month_number)
        .bind(notes)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_payment_by_id(&self, payment_id: Uuid) -> Result<Option<RentPayment>, Error> {
        sqlx::query_as::<_, RentPayment>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS}
            FROM rent_payments
            WHERE id = $1
            "#
        ))
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_payments_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<RentPayment>, Error> {
        sqlx::query_as::<_, RentPayment>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS}
            FROM rent_payments
            WHERE tenant_id = $1
            ORDER BY due_date DESC
            "#
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_payments_for_owner(&self, owner_id: Uuid) -> Result<Vec<RentPayment>, Error> {
        sqlx::query_as::<_, RentPayment>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS}
            FROM rent_payments
            WHERE owner_id = $1
            ORDER BY due_date DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_payment(
        &self,
        payment_id: Uuid,
        update: RentPaymentUpdate,
    ) -> Result<RentPayment, Error> {
        sqlx::query_as::<_, RentPayment>(&format!(
            r#"
            UPDATE rent_payments
            SET status = COALESCE($2, status),
                payment_date = COALESCE($3, payment_date),
                payment_method = COALESCE($4, payment_method),
                transaction_id = COALESCE($5, transaction_id),
                notes = COALESCE($6, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(payment_id)
        .bind(update.status)
        .bind(update.payment_date)
        .bind(update.payment_method)
        .bind(update.transaction_id)
        .bind(update.notes)
        .fetch_one(&self.pool)
        .await
    }

    async fn attach_payment_proof(
        &self,
        payment_id: Uuid,
        proof_path: &str,
    ) -> Result<RentPayment, Error> {
        sqlx::query_as::<_, RentPayment>(&format!(
            r#"
            UPDATE rent_payments
            SET payment_proof = $2,
                verification_status = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(payment_id)
        .bind(proof_path)
        .bind(ReceiptStatus::PendingVerification)
        .fetch_one(&self.pool)
        .await
    }

    async fn approve_receipt(
        &self,
        payment_id: Uuid,
        verified_by: Uuid,
        notes: String,
    ) -> Result<RentPayment, Error> {
        sqlx::query_as::<_, RentPayment>(&format!(
            r#"
            UPDATE rent_payments
            SET verification_status = $2,
                status = $3,
                payment_date = COALESCE(payment_date, NOW()),
                verification_notes = $4,
                verified_by = $5,
                verified_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(payment_id)
        .bind(ReceiptStatus::Verified)
        .bind(PaymentStatus::Paid)
        .bind(notes)
        .bind(verified_by)
        .fetch_one(&self.pool)
        .await
    }

    async fn reject_receipt(
        &self,
        payment_id: Uuid,
        verified_by: Uuid,
        notes: String,
    ) -> Result<RentPayment, Error> {
        sqlx::query_as::<_, RentPayment>(&format!(
            r#"
            UPDATE rent_payments
            SET verification_status = $2,
                verification_notes = $3,
                verified_by = $4,
                verified_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(payment_id)
        .bind(ReceiptStatus::Rejected)
        .bind(notes)
        .bind(verified_by)
        .fetch_one(&self.pool)
        .await
    }

    async fn mark_overdue_payments(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE rent_payments
            SET status = $2, updated_at = NOW()
            WHERE status = 'pending'
              AND due_date < $1
            "#,
        )
        .bind(now)
        .bind(PaymentStatus::Overdue)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn get_payments_needing_reminder(
        &self,
        now: DateTime<Utc>,
        due_before: DateTime<Utc>,
        reminded_before: DateTime<Utc>,
    ) -> Result<Vec<RentPayment>, Error> {
        sqlx::query_as::<_, RentPayment>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS}
            FROM rent_payments
            WHERE status IN ('pending', 'overdue')
              AND due_date >= $1
              AND due_date <= $2
              AND (last_reminder_sent_at IS NULL OR last_reminder_sent_at < $3)
            ORDER BY due_date ASC
            "#
        ))
        .bind(now)
        .bind(due_before)
        .bind(reminded_before)
        .fetch_all(&self.pool)
        .await
    }

    async fn stamp_reminder_sent(
        &self,
        payment_id: Uuid,
        sent_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE rent_payments
            SET last_reminder_sent_at = $2
            WHERE id = $1
            "#,
        )
        .bind(payment_id)
        .bind(sent_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
