use crate::features::users::handlers::user_handler;
use crate::features::users::services::UserService;
use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;

/// User administration (require auth middleware to be applied by caller)
pub fn admin_routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route("/api/admin/users", get(user_handler::list_users))
        .route("/api/admin/users/{id}/access", put(user_handler::set_user_access))
        .with_state(service)
}
