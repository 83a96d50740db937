use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::map::dtos::{BoundingBoxQuery, MapReportDto};

/// Reads the per-report map rows kept fresh by report saves
pub struct MapService {
    pool: PgPool,
}

impl MapService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Reports whose point lies inside the box, most recently updated first
    pub async fn reports_in_bbox(&self, bbox: &BoundingBoxQuery) -> Result<Vec<MapReportDto>> {
        bbox.check()?;

        let reports = sqlx::query_as::<_, MapReportDto>(
            r#"
            SELECT report_num, report_name, pollutant, quantity, quantity_units,
                   latitude, longitude
            FROM report_map
            WHERE longitude BETWEEN $1 AND $3
              AND latitude BETWEEN $2 AND $4
            ORDER BY last_updated DESC
            "#,
        )
        .bind(bbox.lon_min)
        .bind(bbox.lat_min)
        .bind(bbox.lon_max)
        .bind(bbox.lat_max)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to query map reports: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::debug!("{} reports inside {:?}", reports.len(), bbox);
        Ok(reports)
    }
}
