use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::applicationmodel::{Application, ApplicationStatus};

const APPLICATION_COLUMNS: &str = r#"
    id, property_id, tenant_id, owner_id, status, message, move_in_date,
    lease_duration_months, rejection_reason, created_at, updated_at
"#;

#[async_trait]
pub trait ApplicationExt {
    async fn create_application(
        &self,
        property_id: Uuid,
        tenant_id: Uuid,
        owner_id: Uuid,
        message: String,
        move_in_date: DateTime<Utc>,
        lease_duration_months: i32,
    ) -> Result<Application, Error>;

    async fn get_application_by_id(
        &self,
        application_id: Uuid,
    ) -> Result<Option<Application>, Error>;

    /// Any pending or approved application the tenant already has on the property.
    async fn get_live_application(
        &self,
        property_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<Application>, Error>;

    async fn get_applications_by_tenant(&self, tenant_id: Uuid)
        -> Result<Vec<Application>, Error>;

    async fn get_applications_by_owner(
        &self,
        owner_id: Uuid,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>, Error>;

    async fn get_applications_by_property(
        &self,
        property_id: Uuid,
    ) -> Result<Vec<Application>, Error>;

    async fn update_application_status(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
        rejection_reason: Option<String>,
    ) -> Result<Application, Error>;
}

#[async_trait]
impl ApplicationExt for DBClient {
    async fn create_application(
        &self,
        property_id: Uuid,
        tenant_id: Uuid,
        owner_id: Uuid,
        message: String,
        move_in_date: DateTime<Utc>,
        lease_duration_months: i32,
    ) -> Result<Application, Error> {
        sqlx::query_as::<_, Application>(&format!(
            r#"
            INSERT INTO applications
                (property_id, tenant_id, owner_id, message, move_in_date, lease_duration_months)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(property_id)
        .bind(tenant_id)
        .bind(owner_id)
        .bind(message)
        .bind(move_in_date)
        .bind(lease_duration_months)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_application_by_id(
        &self,
        application_id: Uuid,
    ) -> Result<Option<Application>, Error> {
        sqlx::query_as::<_, Application>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM applications
            WHERE id = $1
            "#
        ))
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_live_application(
        &self,
        property_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<Application>, Error> {
        sqlx::query_as::<_, Application>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM applications
            WHERE property_id = $1
              AND tenant_id = $2
              AND status IN ('pending', 'approved')
            "#
        ))
        .bind(property_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_applications_by_tenant(
        &self,
        tenant_id: Uuid,
    ) -> Result<Vec<Application>, Error> {
        sqlx::query_as::<_, Application>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM applications
            WHERE tenant_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_applications_by_owner(
        &self,
        owner_id: Uuid,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>, Error> {
        sqlx::query_as::<_, Application>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM applications
            WHERE owner_id = $1
              AND ($2::application_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#
        ))
        .bind(owner_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_applications_by_property(
        &self,
        property_id: Uuid,
    ) -> Result<Vec<Application>, Error> {
        sqlx::query_as::<_, Application>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM applications
            WHERE property_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(property_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_application_status(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
        rejection_reason: Option<String>,
    ) -> Result<Application, Error> {
        sqlx::query_as::<_, Application>(&format!(
            r#"
            UPDATE applications
            SET status = $2, rejection_reason = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(application_id)
        .bind(status)
        .bind(rejection_reason)
        .fetch_one(&self.pool)
        .await
    }
}
