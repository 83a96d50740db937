use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Attachment row; belongs to a report number, not to a single version
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct AttachedFile {
    pub id: i32,
    pub report_num: String,
    pub filename: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub file_type: String,
}

#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub report_num: String,
    pub filename: String,
    pub file_type: String,
}
