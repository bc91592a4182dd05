use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateLeaseDto {
    pub application_id: Uuid,

    #[validate(range(min = 0, message = "Security deposit cannot be negative"))]
    pub security_deposit: i64,

    #[validate(length(max = 2000, message = "Terms must be at most 2000 characters"))]
    pub terms: Option<String>,
}
