use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireMailingListManager;
use crate::features::notifications::dtos::UpdateMailingListDto;
use crate::features::notifications::models::MailingList;
use crate::features::notifications::services::MailingListStore;
use crate::shared::types::ApiResponse;

/// List every mailing list (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/mailing-lists",
    responses(
        (status = 200, description = "Mailing lists", body = ApiResponse<Vec<MailingList>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn list_mailing_lists(
    RequireMailingListManager(_user): RequireMailingListManager,
    State(store): State<Arc<MailingListStore>>,
) -> Result<Json<ApiResponse<Vec<MailingList>>>> {
    let lists = store.all().await?;
    Ok(Json(ApiResponse::list(lists)))
}

/// Replace the addresses of a mailing list (admin only)
#[utoipa::path(
    put,
    path = "/api/admin/mailing-lists/{name}",
    params(
        ("name" = String, Path, description = "Mailing list name")
    ),
    request_body = UpdateMailingListDto,
    responses(
        (status = 200, description = "Mailing list saved", body = ApiResponse<MailingList>),
        (status = 400, description = "Invalid email address"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn update_mailing_list(
    RequireMailingListManager(user): RequireMailingListManager,
    State(store): State<Arc<MailingListStore>>,
    Path(name): Path<String>,
    AppJson(dto): AppJson<UpdateMailingListDto>,
) -> Result<Json<ApiResponse<MailingList>>> {
    dto.validate()?;

    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation(
            "Mailing list name is required".to_string(),
        ));
    }

    let list = store.save(name, dto.emails).await?;
    tracing::info!("User {} updated mailing list {}", user.id, name);
    Ok(Json(ApiResponse::success(
        Some(list),
        Some("Mailing list saved".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::permissions::Role;
    use crate::features::notifications::routes::admin_routes;
    use crate::shared::test_helpers::{test_user, with_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    fn store() -> (Arc<MailingListStore>, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("spilltracker-admin-{}", uuid::Uuid::now_v7()));
        (
            Arc::new(MailingListStore::new(dir.join("mailing_lists.json"))),
            dir,
        )
    }

    #[tokio::test]
    async fn test_admin_can_replace_list() {
        let (store, dir) = store();
        let app = with_user(admin_routes(store.clone()), test_user(vec![Role::Admin]));
        let server = TestServer::new(app).unwrap();

        let response = server
            .put("/api/admin/mailing-lists/MAIL_LIST_DEFAULT")
            .json(&json!({"emails": ["duty@example.org"]}))
            .await;
        response.assert_status_ok();

        let response = server.get("/api/admin/mailing-lists").await;
        response.assert_status_ok();
        let body: ApiResponse<Vec<MailingList>> = response.json();
        assert_eq!(body.meta.unwrap().total, 1);
        assert_eq!(body.data.unwrap()[0].emails, vec!["duty@example.org"]);

        let _ = tokio::fs::remove_dir_all(dir).await;
    }

    #[tokio::test]
    async fn test_invalid_address_rejected() {
        let (store, _dir) = store();
        let app = with_user(admin_routes(store), test_user(vec![Role::Admin]));
        let server = TestServer::new(app).unwrap();

        let response = server
            .put("/api/admin/mailing-lists/MAIL_LIST_DEFAULT")
            .json(&json!({"emails": ["nope"]}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_regular_user_forbidden() {
        let (store, _dir) = store();
        let app = with_user(admin_routes(store), test_user(vec![Role::User]));
        let server = TestServer::new(app).unwrap();

        server
            .get("/api/admin/mailing-lists")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
