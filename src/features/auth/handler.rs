use crate::core::error::Result;
use crate::features::auth::dto::MeResponseDto;
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::types::ApiResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user retrieved successfully", body = ApiResponse<MeResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(user: AuthenticatedUser) -> Result<Json<ApiResponse<MeResponseDto>>> {
    Ok(Json(ApiResponse::success(Some(user.into()), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::permissions::{Action, Role};
    use crate::shared::test_helpers::{test_user, with_user};
    use axum::{routing::get, Router};
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_get_me_lists_allowed_actions() {
        let app = Router::new().route("/api/auth/me", get(get_me));
        let server = TestServer::new(with_user(app, test_user(vec![Role::User]))).unwrap();

        let response = server.get("/api/auth/me").await;
        response.assert_status_ok();

        let body: ApiResponse<MeResponseDto> = response.json();
        let me = body.data.unwrap();
        assert_eq!(me.roles, vec![Role::User]);
        assert!(me.allowed_actions.contains(&Action::UpdateReports));
        assert!(!me.allowed_actions.contains(&Action::ManageUsers));
    }
}
