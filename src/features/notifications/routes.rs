use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::notifications::handlers;
use crate::features::notifications::services::MailingListStore;

/// Mailing list administration (require auth middleware to be applied by caller)
pub fn admin_routes(store: Arc<MailingListStore>) -> Router {
    Router::new()
        .route("/api/admin/mailing-lists", get(handlers::list_mailing_lists))
        .route(
            "/api/admin/mailing-lists/{name}",
            axum::routing::put(handlers::update_mailing_list),
        )
        .with_state(store)
}
