use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::{self, dto::MeResponseDto};
use crate::features::exports::handlers as exports_handlers;
use crate::features::geo::{dtos as geo_dtos, handlers as geo_handlers, services as geo_services};
use crate::features::lookups::handler as lookups_handler;
use crate::features::map::{dtos as map_dtos, handlers as map_handlers};
use crate::features::notifications::{
    dtos as notifications_dtos, handlers as notifications_handlers,
    models as notifications_models,
};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers};
use crate::shared::lookups::{LookupsDto, TimezoneOption};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handler::get_me,
        // Reports
        reports_handlers::list_reports,
        reports_handlers::save_report,
        reports_handlers::upload_attachments,
        reports_handlers::get_report,
        reports_handlers::list_versions,
        reports_handlers::get_report_version,
        reports_handlers::download_attachment,
        // Exports
        exports_handlers::export_all_reports,
        exports_handlers::export_report,
        exports_handlers::export_report_version,
        // Map
        map_handlers::reports_in_bbox,
        // Geo
        geo_handlers::latlon_to_coords,
        geo_handlers::chk_coordinates,
        // Lookups
        lookups_handler::get_lookups,
        // Admin
        users_handlers::list_users,
        users_handlers::set_user_access,
        notifications_handlers::list_mailing_lists,
        notifications_handlers::update_mailing_list,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            MeResponseDto,
            auth::permissions::Role,
            auth::permissions::Action,
            ApiResponse<MeResponseDto>,
            // Reports
            reports_models::SpillReport,
            reports_models::ReportFields,
            reports_models::AttachedFile,
            reports_dtos::SaveReportDto,
            reports_dtos::SaveReportResponseDto,
            reports_dtos::ReportDisplayDto,
            reports_dtos::AttachmentDto,
            reports_dtos::VersionTimestampDto,
            reports_dtos::StagedAttachmentDto,
            reports_dtos::UploadAttachmentsDto,
            ApiResponse<reports_dtos::SaveReportResponseDto>,
            ApiResponse<reports_dtos::ReportDisplayDto>,
            ApiResponse<Vec<reports_models::SpillReport>>,
            ApiResponse<Vec<reports_dtos::VersionTimestampDto>>,
            ApiResponse<Vec<reports_dtos::StagedAttachmentDto>>,
            // Map
            map_dtos::MapReportDto,
            ApiResponse<Vec<map_dtos::MapReportDto>>,
            // Geo
            geo_dtos::LatLngDto,
            geo_dtos::CheckCoordinatesDto,
            geo_services::CoordinateFormat,
            geo_services::CoordinateStrings,
            geo_services::LatLon,
            ApiResponse<geo_services::CoordinateStrings>,
            ApiResponse<geo_services::LatLon>,
            // Lookups
            LookupsDto,
            TimezoneOption,
            ApiResponse<LookupsDto>,
            // Admin
            users_dtos::UserAccessDto,
            users_dtos::SetUserAccessDto,
            ApiResponse<users_dtos::UserAccessDto>,
            ApiResponse<Vec<users_dtos::UserAccessDto>>,
            notifications_models::MailingList,
            notifications_dtos::UpdateMailingListDto,
            ApiResponse<notifications_models::MailingList>,
            ApiResponse<Vec<notifications_models::MailingList>>,
        )
    ),
    tags(
        (name = "auth", description = "Current user and permissions"),
        (name = "reports", description = "Versioned spill reports and attachments"),
        (name = "map", description = "Latest report positions for the map view"),
        (name = "geo", description = "Coordinate conversion helpers"),
        (name = "lookups", description = "Form option lists"),
        (name = "admin", description = "User access and mailing list administration"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Spill Tracker API",
        version = "0.1.0",
        description = "API documentation for the marine pollution spill tracker",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_report_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/api/reports"));
        assert!(paths
            .iter()
            .any(|p| p.as_str() == "/api/reports/{report_num}/versions/{ts}"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/map/reports"));
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
