use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{AttachedFile, NewAttachment, ReportFields, SpillReport};

use super::ReportRepository;

const REPORT_COLUMNS: &str = r#"
    id, last_updated, recorded_by, user_id,
    report_num, report_name, update_text, report_date, report_timezone,
    spill_date, spill_timezone, name_reporter, phone_reporter, email_reporter,
    coordinate_type, coordinates, latitude, longitude, location_description,
    pollutant, pollutant_details, quantity, quantity_units, colour_odour,
    origin, weather, situation_info, response_activated,
    vessel_name, call_sign, vessel_length, vessel_type, owner_agent, vessel_additional_info,
    ccg_duty_officer, tc_marine_safety, vancouver_hm, area_mcts_centre,
    dfo_public_affairs, roc_officer,
    er_region, fleet_tasking, station_or_ship, unit, severity
"#;

/// PostgreSQL store for spill reports
pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn next_report_sequence(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT nextval('polrep_num')")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get next report number: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn insert_version(
        &self,
        last_updated: DateTime<Utc>,
        fields: &ReportFields,
    ) -> Result<SpillReport> {
        let sql = format!(
            r#"
            INSERT INTO spill_reports (
                last_updated, recorded_by, user_id,
                report_num, report_name, update_text, report_date, report_timezone,
                spill_date, spill_timezone, name_reporter, phone_reporter, email_reporter,
                coordinate_type, coordinates, latitude, longitude, location_description,
                pollutant, pollutant_details, quantity, quantity_units, colour_odour,
                origin, weather, situation_info, response_activated,
                vessel_name, call_sign, vessel_length, vessel_type, owner_agent, vessel_additional_info,
                ccg_duty_officer, tc_marine_safety, vancouver_hm, area_mcts_centre,
                dfo_public_affairs, roc_officer,
                er_region, fleet_tasking, station_or_ship, unit, severity
            )
            VALUES (
                $1, $2, $3,
                $4, $5, $6, $7, $8,
                $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18,
                $19, $20, $21, $22, $23,
                $24, $25, $26, $27,
                $28, $29, $30, $31, $32, $33,
                $34, $35, $36, $37,
                $38, $39,
                $40, $41, $42, $43, $44
            )
            RETURNING {}
            "#,
            REPORT_COLUMNS
        );

        let report = sqlx::query_as::<_, SpillReport>(&sql)
            .bind(last_updated)
            .bind(&fields.recorded_by)
            .bind(fields.user_id)
            .bind(&fields.report_num)
            .bind(&fields.report_name)
            .bind(&fields.update_text)
            .bind(fields.report_date)
            .bind(&fields.report_timezone)
            .bind(fields.spill_date)
            .bind(&fields.spill_timezone)
            .bind(&fields.name_reporter)
            .bind(&fields.phone_reporter)
            .bind(&fields.email_reporter)
            .bind(&fields.coordinate_type)
            .bind(&fields.coordinates)
            .bind(fields.latitude)
            .bind(fields.longitude)
            .bind(&fields.location_description)
            .bind(&fields.pollutant)
            .bind(&fields.pollutant_details)
            .bind(&fields.quantity)
            .bind(&fields.quantity_units)
            .bind(&fields.colour_odour)
            .bind(&fields.origin)
            .bind(&fields.weather)
            .bind(&fields.situation_info)
            .bind(&fields.response_activated)
            .bind(&fields.vessel_name)
            .bind(&fields.call_sign)
            .bind(&fields.vessel_length)
            .bind(&fields.vessel_type)
            .bind(&fields.owner_agent)
            .bind(&fields.vessel_additional_info)
            .bind(&fields.ccg_duty_officer)
            .bind(&fields.tc_marine_safety)
            .bind(&fields.vancouver_hm)
            .bind(&fields.area_mcts_centre)
            .bind(&fields.dfo_public_affairs)
            .bind(&fields.roc_officer)
            .bind(&fields.er_region)
            .bind(&fields.fleet_tasking)
            .bind(&fields.station_or_ship)
            .bind(&fields.unit)
            .bind(fields.severity)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to insert version of report {}: {:?}",
                    fields.report_num,
                    e
                );
                AppError::Database(e)
            })?;

        Ok(report)
    }

    async fn latest_versions(
        &self,
        report_num: &str,
        at: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<SpillReport>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM spill_reports
            WHERE report_num = $1
              AND ($2::timestamptz IS NULL OR last_updated <= $2)
            ORDER BY last_updated DESC, id DESC
            LIMIT $3
            "#,
            REPORT_COLUMNS
        );

        let reports = sqlx::query_as::<_, SpillReport>(&sql)
            .bind(report_num)
            .bind(at)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(reports)
    }

    async fn count_versions(&self, report_num: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM spill_reports WHERE report_num = $1",
        )
        .bind(report_num)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn all_versions(&self) -> Result<Vec<SpillReport>> {
        let sql = format!("SELECT {} FROM spill_reports ORDER BY id", REPORT_COLUMNS);
        let reports = sqlx::query_as::<_, SpillReport>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(reports)
    }

    async fn version_timestamps(&self, report_num: &str) -> Result<Vec<DateTime<Utc>>> {
        let timestamps = sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"
            SELECT last_updated
            FROM spill_reports
            WHERE report_num = $1
            ORDER BY last_updated DESC, id DESC
            "#,
        )
        .bind(report_num)
        .fetch_all(&self.pool)
        .await?;

        Ok(timestamps)
    }

    async fn refresh_report_map(&self, report_num: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM report_map WHERE report_num = $1")
            .bind(report_num)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO report_map (
                report_num, report_name, pollutant, quantity, quantity_units,
                latitude, longitude, last_updated
            )
            SELECT report_num, report_name, pollutant, quantity, quantity_units,
                   latitude, longitude, last_updated
            FROM report_map_view
            WHERE report_num = $1
            "#,
        )
        .bind(report_num)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!("Refreshed map row for report {}", report_num);
        Ok(())
    }

    async fn insert_attachments(&self, attachments: &[NewAttachment]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for attachment in attachments {
            sqlx::query("INSERT INTO attachments (report_num, filename, type) VALUES ($1, $2, $3)")
                .bind(&attachment.report_num)
                .bind(&attachment.filename)
                .bind(&attachment.file_type)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_attachments(&self, report_num: &str) -> Result<Vec<AttachedFile>> {
        let attachments = sqlx::query_as::<_, AttachedFile>(
            r#"
            SELECT id, report_num, filename, type
            FROM attachments
            WHERE report_num = $1
            ORDER BY id
            "#,
        )
        .bind(report_num)
        .fetch_all(&self.pool)
        .await?;

        Ok(attachments)
    }

    async fn find_staff_name(&self, user_id: i32) -> Result<Option<String>> {
        let name = sqlx::query_scalar::<_, Option<String>>(
            "SELECT staff_name FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(name.flatten())
    }
}
