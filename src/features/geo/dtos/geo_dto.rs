use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Point picked on the map
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct LatLngDto {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90, 90 degrees"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180, 180 degrees"))]
    pub lng: f64,
}

/// Hand-typed coordinate text to check
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CheckCoordinatesDto {
    pub coordinate_type: String,
    pub coord_str: String,
}
