use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// An account as shown on the user administration screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserAccessDto {
    pub id: i32,
    pub email: String,
    pub staff_name: Option<String>,
    /// `nologin`, `admin`, `user` or `observer`
    #[schema(example = "observer")]
    pub access: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SetUserAccessDto {
    #[validate(length(min = 1, max = 80, message = "Access level is required"))]
    #[schema(example = "user")]
    pub access: String,
}
