use axum::{routing::post, Router};

use crate::features::geo::handlers;

/// Coordinate conversion helpers used by the report form
pub fn routes() -> Router {
    Router::new()
        .route("/api/geo/latlon_to_coords", post(handlers::latlon_to_coords))
        .route("/api/geo/chk_coordinates", post(handlers::chk_coordinates))
}
