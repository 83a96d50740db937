use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::model::AuthenticatedUser;
use super::permissions::{Action, Role};

/// DTO for /auth/me response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponseDto {
    pub id: i32,
    pub email: String,
    pub staff_name: Option<String>,
    pub roles: Vec<Role>,
    pub allowed_actions: Vec<Action>,
}

impl From<AuthenticatedUser> for MeResponseDto {
    fn from(user: AuthenticatedUser) -> Self {
        let allowed_actions = user.allowed_actions().into_iter().collect();
        Self {
            id: user.id,
            email: user.email,
            staff_name: user.staff_name,
            roles: user.roles,
            allowed_actions,
        }
    }
}
