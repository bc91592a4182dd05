use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateReviewDto {
    pub property_id: Uuid,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(length(min = 5, max = 100, message = "Title must be between 5 and 100 characters"))]
    pub title: String,

    #[validate(length(min = 20, max = 1000, message = "Comment must be between 20 and 1000 characters"))]
    pub comment: String,

    #[validate(length(max = 5, message = "Maximum 5 pros allowed"))]
    pub pros: Option<Vec<String>>,

    #[validate(length(max = 5, message = "Maximum 5 cons allowed"))]
    pub cons: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewListQuery {
    pub rating: Option<i32>,
    pub page: Option<u32>,
    pub limit: Option<usize>,
}
