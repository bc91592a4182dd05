use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::applicationmodel::ApplicationStatus;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateApplicationDto {
    pub property_id: Uuid,

    #[validate(length(min = 1, max = 500, message = "Message must be between 1 and 500 characters"))]
    pub message: String,

    pub move_in_date: DateTime<Utc>,

    #[validate(range(min = 1, max = 60, message = "Lease duration must be between 1 and 60 months"))]
    pub lease_duration_months: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateApplicationStatusDto {
    pub status: ApplicationStatus,

    #[validate(length(max = 300, message = "Rejection reason must be at most 300 characters"))]
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationFilterQuery {
    pub status: Option<ApplicationStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_lease_duration() {
        let dto = CreateApplicationDto {
            property_id: Uuid::new_v4(),
            message: "Interested in the flat".to_string(),
            move_in_date: Utc::now(),
            lease_duration_months: 61,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn accepts_a_valid_application() {
        let dto = CreateApplicationDto {
            property_id: Uuid::new_v4(),
            message: "Interested in the flat".to_string(),
            move_in_date: Utc::now(),
            lease_duration_months: 12,
        };
        assert!(dto.validate().is_ok());
    }
}
