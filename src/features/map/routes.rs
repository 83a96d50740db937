use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::map::handlers;
use crate::features::map::services::MapService;

/// Map queries (require auth middleware to be applied by caller)
pub fn routes(map_service: Arc<MapService>) -> Router {
    Router::new()
        .route("/api/map/reports", get(handlers::reports_in_bbox))
        .with_state(map_service)
}
