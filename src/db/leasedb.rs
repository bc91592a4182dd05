use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::leasemodel::{Lease, LeaseStatus};
use crate::models::propertymodel::PropertyStatus;
use crate::models::rentmodel::PaymentStatus;
use crate::service::rent_schedule::ScheduledPayment;

const LEASE_COLUMNS: &str = r#"
    id, property_id, tenant_id, owner_id, application_id, start_date, end_date,
    monthly_rent, security_deposit, status, terms, created_at, updated_at
"#;

pub struct NewLease {
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub owner_id: Uuid,
    pub application_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub monthly_rent: i64,
    pub security_deposit: i64,
    pub terms: Option<String>,
}

#[async_trait]
pub trait LeaseExt {
    /// Insert the lease, its full rent schedule, and the property status flip
    /// in a single transaction. A failure anywhere rolls everything back, so
    /// a lease can never exist without its payments.
    async fn create_lease_with_payments(
        &self,
        lease: NewLease,
        schedule: Vec<ScheduledPayment>,
    ) -> Result<Lease, Error>;

    async fn get_lease_by_id(&self, lease_id: Uuid) -> Result<Option<Lease>, Error>;

    async fn get_active_lease_by_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<Lease>, Error>;

    /// Qualifying lease for a review: active or completed, started on or
    /// before `now`.
    async fn get_qualifying_lease(
        &self,
        tenant_id: Uuid,
        property_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Lease>, Error>;

    async fn get_active_leases_for_owner(&self, owner_id: Uuid) -> Result<Vec<Lease>, Error>;

    async fn get_active_leases_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<Lease>, Error>;

    /// Terminate the lease, cancel its still-pending payments and free the
    /// property, all in one transaction.
    async fn terminate_lease(&self, lease_id: Uuid) -> Result<Lease, Error>;
}

#[async_trait]
impl LeaseExt for DBClient {
    async fn create_lease_with_payments(
        &self,
        lease: NewLease,
        schedule: Vec<ScheduledPayment>,
    ) -> Result<Lease, Error> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Lease>(&format!(
            r#"
            INSERT INTO leases
                (property_id, tenant_id, owner_id, application_id, start_date,
                 end_date, monthly_rent, security_deposit, terms)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {LEASE_COLUMNS}
            "#
        ))
        .bind(lease.property_id)
        .bind(lease.tenant_id)
        .bind(lease.owner_id)
        .bind(lease.application_id)
        .bind(lease.start_date)
        .bind(lease.end_date)
        .bind(lease.monthly_rent)
        .bind(lease.security_deposit)
        .bind(lease.terms)
        .fetch_one(&mut *tx)
        .await?;

        for payment in &schedule {
            sqlx::query(
                r#"
                INSERT INTO rent_payments
                    (lease_id, property_id, tenant_id, owner_id, amount,
                     due_date, month_number)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(created.id)
            .bind(lease.property_id)
            .bind(lease.tenant_id)
            .bind(lease.owner_id)
            .bind(payment.amount)
            .bind(payment.due_date)
            .bind(payment.month_number)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            UPDATE properties
            SET status = $2, current_tenant_id = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(lease.property_id)
        .bind(PropertyStatus::Rented)
        .bind(lease.tenant_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn get_lease_by_id(&self, lease_id: Uuid) -> Result<Option<Lease>, Error> {
        sqlx::query_as::<_, Lease>(&format!(
            r#"
            SELECT {LEASE_COLUMNS}
            FROM leases
            WHERE id = $1
            "#
        ))
        .bind(lease_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_active_lease_by_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<Lease>, Error> {
        sqlx::query_as::<_, Lease>(&format!(
            r#"
            SELECT {LEASE_COLUMNS}
            FROM leases
            WHERE application_id = $1
              AND status = 'active'
            "#
        ))
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_qualifying_lease(
        &self,
        tenant_id: Uuid,
        property_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Lease>, Error> {
        sqlx::query_as::<_, Lease>(&format!(
            r#"
            SELECT {LEASE_COLUMNS}
            FROM leases
            WHERE tenant_id = $1
              AND property_id = $2
              AND status IN ('active', 'completed')
              AND start_date <= $3
            LIMIT 1
            "#
        ))
        .bind(tenant_id)
        .bind(property_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_active_leases_for_owner(&self, owner_id: Uuid) -> Result<Vec<Lease>, Error> {
        sqlx::query_as::<_, Lease>(&format!(
            r#"
            SELECT {LEASE_COLUMNS}
            FROM leases
            WHERE owner_id = $1
              AND status = 'active'
            ORDER BY created_at DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_active_leases_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<Lease>, Error> {
        sqlx::query_as::<_, Lease>(&format!(
            r#"
            SELECT {LEASE_COLUMNS}
            FROM leases
            WHERE tenant_id = $1
              AND status = 'active'
            ORDER BY created_at DESC
            "#
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn terminate_lease(&self, lease_id: Uuid) -> Result<Lease, Error> {
        let mut tx = self.pool.begin().await?;

        let lease = sqlx::query_as::<_, Lease>(&format!(
            r#"
            UPDATE leases
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {LEASE_COLUMNS}
            "#
        ))
        .bind(lease_id)
        .bind(LeaseStatus::Terminated)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE rent_payments
            SET status = $2, updated_at = NOW()
            WHERE lease_id = $1
              AND status = 'pending'
            "#,
        )
        .bind(lease_id)
        .bind(PaymentStatus::Cancelled)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE properties
            SET status = $2, current_tenant_id = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(lease.property_id)
        .bind(PropertyStatus::Available)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(lease)
    }
}
