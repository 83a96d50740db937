use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::map::dtos::{BoundingBoxQuery, MapReportDto};
use crate::features::map::services::MapService;
use crate::shared::types::ApiResponse;

/// Reports located inside a bounding box
#[utoipa::path(
    get,
    path = "/api/map/reports",
    params(BoundingBoxQuery),
    responses(
        (status = 200, description = "Reports inside the box", body = ApiResponse<Vec<MapReportDto>>),
        (status = 400, description = "Invalid bounding box"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "map"
)]
pub async fn reports_in_bbox(
    _user: AuthenticatedUser,
    State(service): State<Arc<MapService>>,
    Query(bbox): Query<BoundingBoxQuery>,
) -> Result<Json<ApiResponse<Vec<MapReportDto>>>> {
    let reports = service.reports_in_bbox(&bbox).await?;
    Ok(Json(ApiResponse::list(reports)))
}
