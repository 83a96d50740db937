//! Capability-based permissions.
//!
//! Roles never grant access directly; handlers ask for an [`Action`] and the
//! role set of the user is mapped to the actions it allows.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{ROLE_ADMIN, ROLE_OBSERVER, ROLE_USER};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Observer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::User => ROLE_USER,
            Role::Observer => ROLE_OBSERVER,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_USER => Ok(Role::User),
            ROLE_OBSERVER => Ok(Role::Observer),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ViewReports,
    ExportReports,
    CreateReports,
    UpdateReports,
    ManageUsers,
    ManageMailingLists,
}

fn actions_for(role: Role) -> &'static [Action] {
    match role {
        Role::Observer => &[Action::ViewReports, Action::ExportReports],
        Role::User => &[
            Action::ViewReports,
            Action::ExportReports,
            Action::CreateReports,
            Action::UpdateReports,
        ],
        Role::Admin => &[
            Action::ViewReports,
            Action::ExportReports,
            Action::CreateReports,
            Action::UpdateReports,
            Action::ManageUsers,
            Action::ManageMailingLists,
        ],
    }
}

/// Union of the actions granted by each role; no role means observer
pub fn allowed_actions(roles: &[Role]) -> BTreeSet<Action> {
    if roles.is_empty() {
        return actions_for(Role::Observer).iter().copied().collect();
    }
    roles
        .iter()
        .flat_map(|role| actions_for(*role).iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observer_is_read_only() {
        let actions = allowed_actions(&[Role::Observer]);
        assert!(actions.contains(&Action::ViewReports));
        assert!(actions.contains(&Action::ExportReports));
        assert!(!actions.contains(&Action::CreateReports));
        assert!(!actions.contains(&Action::ManageUsers));
    }

    #[test]
    fn test_no_roles_treated_as_observer() {
        assert_eq!(allowed_actions(&[]), allowed_actions(&[Role::Observer]));
    }

    #[test]
    fn test_user_can_edit_reports_but_not_administer() {
        let actions = allowed_actions(&[Role::User]);
        assert!(actions.contains(&Action::CreateReports));
        assert!(actions.contains(&Action::UpdateReports));
        assert!(!actions.contains(&Action::ManageMailingLists));
    }

    #[test]
    fn test_admin_has_everything() {
        let actions = allowed_actions(&[Role::Admin]);
        assert_eq!(actions.len(), 6);
    }

    #[test]
    fn test_roles_are_combined() {
        let actions = allowed_actions(&[Role::Observer, Role::User]);
        assert_eq!(actions, allowed_actions(&[Role::User]));
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert!("nologin".parse::<Role>().is_err());
    }
}
