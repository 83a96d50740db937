use axum::Json;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::geo::dtos::{CheckCoordinatesDto, LatLngDto};
use crate::features::geo::services::{
    convert_from_latlon, convert_to_latlon, CoordinateFormat, CoordinateStrings, LatLon,
};
use crate::shared::types::ApiResponse;

/// Write a map point in every coordinate notation
#[utoipa::path(
    post,
    path = "/api/geo/latlon_to_coords",
    request_body = LatLngDto,
    responses(
        (status = 200, description = "Coordinates in all notations", body = ApiResponse<CoordinateStrings>),
        (status = 400, description = "Latitude or longitude out of range"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "geo"
)]
pub async fn latlon_to_coords(
    AppJson(dto): AppJson<LatLngDto>,
) -> Result<Json<ApiResponse<CoordinateStrings>>> {
    dto.validate()?;

    let coords = convert_from_latlon(dto.lat, dto.lng);
    Ok(Json(ApiResponse::success(Some(coords), None, None)))
}

/// Validate hand-typed coordinates and resolve them to lat/lon
#[utoipa::path(
    post,
    path = "/api/geo/chk_coordinates",
    request_body = CheckCoordinatesDto,
    responses(
        (status = 200, description = "Coordinates are valid", body = ApiResponse<LatLon>),
        (status = 400, description = "Conversion failed; message explains why"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "geo"
)]
pub async fn chk_coordinates(
    AppJson(dto): AppJson<CheckCoordinatesDto>,
) -> Result<Json<ApiResponse<LatLon>>> {
    let format: CoordinateFormat = dto.coordinate_type.parse()?;
    let point = convert_to_latlon(format, &dto.coord_str)?;
    Ok(Json(ApiResponse::success(
        Some(point),
        Some("OK".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::geo::routes;
    use crate::features::auth::permissions::Role;
    use crate::shared::test_helpers::{test_user, with_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    fn server() -> TestServer {
        TestServer::new(with_user(routes::routes(), test_user(vec![Role::Observer]))).unwrap()
    }

    #[tokio::test]
    async fn test_chk_coordinates_ok() {
        let response = server()
            .post("/api/geo/chk_coordinates")
            .json(&json!({
                "coordinate_type": "Degrees Minutes Seconds",
                "coord_str": "49 16 58 N 123 7 14 W"
            }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "OK");
        assert!((body["data"]["lat"].as_f64().unwrap() - 49.2828).abs() < 0.0001);
    }

    #[tokio::test]
    async fn test_chk_coordinates_returns_converter_message() {
        let response = server()
            .post("/api/geo/chk_coordinates")
            .json(&json!({
                "coordinate_type": "Decimal Degrees",
                "coord_str": "95.0,0.0"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(
            body["message"],
            "Latitude must be between -90, 90 degrees (value: 95)"
        );
    }

    #[tokio::test]
    async fn test_latlon_to_coords() {
        let response = server()
            .post("/api/geo/latlon_to_coords")
            .json(&json!({ "lat": 49.282778, "lng": -123.120556 }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(
            body["data"]["Degrees Minutes Seconds"],
            "49 16 58 N 123 7 14 W"
        );
    }

    #[tokio::test]
    async fn test_latlon_to_coords_rejects_out_of_range() {
        let response = server()
            .post("/api/geo/latlon_to_coords")
            .json(&json!({ "lat": 120.0, "lng": 0.0 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Latitude must be between -90, 90 degrees");
        assert_eq!(body["errors"].as_array().map(Vec::len), Some(1));
    }
}
