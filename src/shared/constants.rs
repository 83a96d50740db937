// =============================================================================
// TIMESTAMP FORMATS
// =============================================================================

/// Human readable timestamp, also used in spreadsheet exports
pub const DISPLAY_DATE_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// URL and filename safe version key
pub const FILESAFE_TIMESTAMP: &str = "%Y%m%d-%H%M%S";

/// Value format of an HTML `datetime-local` input
pub const HTML_TIMESTAMP: &str = "%Y-%m-%dT%H:%M";

/// Coast Guard display convention (24h, no colon)
pub const CCG_DISPLAY_FMT: &str = "%Y-%m-%d %H%M";

// =============================================================================
// ATTACHMENTS
// =============================================================================

pub const IMAGE_FORMATS: &[&str] = &["jpg", "jpeg", "tif", "tiff", "png"];

pub const DOCUMENT_FORMATS: &[&str] = &["doc", "docx", "pdf"];

/// Maximum size of a single uploaded attachment
pub const MAX_ATTACHMENT_SIZE: usize = 20 * 1024 * 1024;

pub fn is_image_extension(extension: &str) -> bool {
    IMAGE_FORMATS.contains(&extension)
}

pub fn is_allowed_extension(extension: &str) -> bool {
    is_image_extension(extension) || DOCUMENT_FORMATS.contains(&extension)
}

// =============================================================================
// REPORTS
// =============================================================================

/// Marker shown in a diff when the previous value was null or blank
pub const EMPTY_MARKER: &str = "(empty)";

/// Mailing list that receives every report update
pub const DEFAULT_MAILING_LIST: &str = "MAIL_LIST_DEFAULT";

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Administrator - manages users and mailing lists
pub const ROLE_ADMIN: &str = "admin";

/// Staff user - creates and updates reports
pub const ROLE_USER: &str = "user";

/// Observer - read-only access
pub const ROLE_OBSERVER: &str = "observer";

/// Pseudo role used by the admin screen for deactivated accounts
pub const ACCESS_NOLOGIN: &str = "nologin";

// =============================================================================
// NOTIFICATION CONSTANTS
// =============================================================================

/// Upper bound on a single mail relay request, connect included
pub const MAIL_RELAY_TIMEOUT_SECS: u64 = 10;
