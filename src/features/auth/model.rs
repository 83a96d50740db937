use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::permissions::{allowed_actions, Action, Role};

/// User loaded once per request by the auth middleware
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub email: String,
    pub staff_name: Option<String>,
    pub roles: Vec<Role>,
}

impl AuthenticatedUser {
    pub fn allowed_actions(&self) -> BTreeSet<Action> {
        allowed_actions(&self.roles)
    }

    pub fn can(&self, action: Action) -> bool {
        self.allowed_actions().contains(&action)
    }

    /// Name recorded on reports, falls back to the email address
    pub fn display_name(&self) -> &str {
        self.staff_name.as_deref().unwrap_or(&self.email)
    }
}
