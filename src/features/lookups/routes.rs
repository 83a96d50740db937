use crate::features::lookups::handler;
use axum::{routing::get, Router};

pub fn routes() -> Router {
    Router::new().route("/api/lookups", get(handler::get_lookups))
}
