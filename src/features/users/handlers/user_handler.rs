use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireUserManager;
use crate::features::users::dtos::{SetUserAccessDto, UserAccessDto};
use crate::features::users::services::UserService;
use crate::shared::types::ApiResponse;

/// List every account with its access level (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "Accounts", body = ApiResponse<Vec<UserAccessDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn list_users(
    RequireUserManager(_admin): RequireUserManager,
    State(service): State<Arc<UserService>>,
) -> Result<Json<ApiResponse<Vec<UserAccessDto>>>> {
    let users = service.list_all_users().await?;
    Ok(Json(ApiResponse::list(users)))
}

/// Change an account's access level (admin only)
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/access",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = SetUserAccessDto,
    responses(
        (status = 200, description = "Access updated", body = ApiResponse<UserAccessDto>),
        (status = 400, description = "Unknown access level"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn set_user_access(
    RequireUserManager(admin): RequireUserManager,
    State(service): State<Arc<UserService>>,
    Path(id): Path<i32>,
    AppJson(dto): AppJson<SetUserAccessDto>,
) -> Result<Json<ApiResponse<UserAccessDto>>> {
    dto.validate()?;

    let user = service.set_user_access(id, &dto.access).await?;
    tracing::info!("Admin {} changed access of user {}", admin.id, id);
    Ok(Json(ApiResponse::success(
        Some(user),
        Some("Access updated".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::permissions::Role;
    use crate::features::users::routes::admin_routes;
    use crate::shared::test_helpers::{test_user, with_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use sqlx::postgres::PgPoolOptions;

    fn server(roles: Vec<Role>) -> TestServer {
        // Lazy pool: these requests are rejected before any query runs
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/spilltracker_unused")
            .unwrap();
        let app = admin_routes(Arc::new(UserService::new(pool)));
        TestServer::new(with_user(app, test_user(roles))).unwrap()
    }

    #[tokio::test]
    async fn test_non_admin_forbidden() {
        let server = server(vec![Role::User]);
        server
            .get("/api/admin/users")
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .put("/api/admin/users/2/access")
            .json(&json!({"access": "admin"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unknown_access_level_rejected() {
        let server = server(vec![Role::Admin]);
        let response = server
            .put("/api/admin/users/2/access")
            .json(&json!({"access": "superuser"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Unknown access level: superuser");
    }
}
