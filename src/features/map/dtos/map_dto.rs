use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::core::error::AppError;

/// Visible map area in decimal degrees
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BoundingBoxQuery {
    #[param(example = -125.0)]
    pub lon_min: f64,
    #[param(example = 48.0)]
    pub lat_min: f64,
    #[param(example = -122.0)]
    pub lon_max: f64,
    #[param(example = 50.5)]
    pub lat_max: f64,
}

impl BoundingBoxQuery {
    pub fn check(&self) -> Result<(), AppError> {
        let values = [self.lon_min, self.lat_min, self.lon_max, self.lat_max];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(AppError::Validation(
                "Bounding box values must be finite numbers".to_string(),
            ));
        }
        if self.lon_min > self.lon_max || self.lat_min > self.lat_max {
            return Err(AppError::Validation(
                "Bounding box minimum must not exceed maximum".to_string(),
            ));
        }
        Ok(())
    }
}

/// Latest located version of a report, as drawn on the map
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct MapReportDto {
    pub report_num: String,
    pub report_name: Option<String>,
    pub pollutant: Option<String>,
    pub quantity: Option<String>,
    pub quantity_units: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(lon_min: f64, lat_min: f64, lon_max: f64, lat_max: f64) -> BoundingBoxQuery {
        BoundingBoxQuery {
            lon_min,
            lat_min,
            lon_max,
            lat_max,
        }
    }

    #[test]
    fn test_check_bounds() {
        assert!(bbox(-125.0, 48.0, -122.0, 50.5).check().is_ok());
        assert!(bbox(-123.0, 49.0, -123.0, 49.0).check().is_ok());
        assert!(matches!(
            bbox(-122.0, 48.0, -125.0, 50.5).check(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            bbox(f64::NAN, 48.0, -122.0, 50.5).check(),
            Err(AppError::Validation(_))
        ));
        assert!(bbox(-125.0, 48.0, f64::INFINITY, 50.5).check().is_err());
    }
}
