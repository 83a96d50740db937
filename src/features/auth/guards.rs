//! Permission guards for handlers.
//!
//! Each guard extracts the authenticated user and checks a single [`Action`].
//! A missing user is 401, a missing permission is 403.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::permissions::Action;
use axum::{extract::FromRequestParts, http::request::Parts};

fn require_action(
    parts: &Parts,
    action: Action,
    denied: &str,
) -> Result<AuthenticatedUser, AppError> {
    let user = parts
        .extensions
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

    if !user.can(action) {
        tracing::warn!("User {} denied {:?}", user.id, action);
        return Err(AppError::Forbidden(denied.to_string()));
    }

    Ok(user.clone())
}

/// Guard for creating and updating spill reports.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireReportEditor(user): RequireReportEditor) { ... }
/// ```
pub struct RequireReportEditor(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireReportEditor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_action(
            parts,
            Action::UpdateReports,
            "Report editing access required",
        )
        .map(RequireReportEditor)
    }
}

/// Guard for spreadsheet exports
pub struct RequireExporter(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireExporter
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_action(parts, Action::ExportReports, "Export access required")
            .map(RequireExporter)
    }
}

/// Guard for the user administration screen
pub struct RequireUserManager(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireUserManager
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_action(parts, Action::ManageUsers, "Admin access required")
            .map(RequireUserManager)
    }
}

pub struct RequireMailingListManager(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireMailingListManager
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_action(parts, Action::ManageMailingLists, "Admin access required")
            .map(RequireMailingListManager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::permissions::Role;
    use crate::shared::test_helpers::{test_user, with_user};
    use axum::{http::StatusCode, routing::get, Router};
    use axum_test::TestServer;

    async fn edit(RequireReportEditor(user): RequireReportEditor) -> String {
        user.email
    }

    async fn manage(RequireUserManager(user): RequireUserManager) -> String {
        user.email
    }

    fn app() -> Router {
        Router::new()
            .route("/edit", get(edit))
            .route("/manage", get(manage))
    }

    #[tokio::test]
    async fn test_missing_user_is_unauthorized() {
        let server = TestServer::new(app()).unwrap();
        let response = server.get("/edit").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_observer_cannot_edit() {
        let server = TestServer::new(with_user(app(), test_user(vec![Role::Observer]))).unwrap();
        server.get("/edit").await.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_user_can_edit_but_not_manage() {
        let server = TestServer::new(with_user(app(), test_user(vec![Role::User]))).unwrap();
        server.get("/edit").await.assert_status_ok();
        server.get("/manage").await.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_can_manage() {
        let server = TestServer::new(with_user(app(), test_user(vec![Role::Admin]))).unwrap();
        let response = server.get("/manage").await;
        response.assert_status_ok();
        response.assert_text("duty.officer@example.org");
    }
}
