use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Any run of whitespace, collapsed to one space when comparing report versions
    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    /// Report number as generated by the sequence: "{year}-{n}"
    /// - Valid: "2021-14", "2019-1"
    /// - Invalid: "14", "2021-", "21-14"
    pub static ref REPORT_NUM_REGEX: Regex = Regex::new(r"^\d{4}-\d+$").unwrap();

    /// Attachment filename after sanitizing: no path separators, no leading dot
    pub static ref SAFE_FILENAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]*$").unwrap();
}

/// Remove linebreaks, collapse whitespace and trim
pub fn clean_string(text: &str) -> String {
    let without_breaks = text.replace(['\r', '\n'], "");
    WHITESPACE_RUN
        .replace_all(&without_breaks, " ")
        .trim()
        .to_string()
}

/// Reduce an uploaded filename to a safe basename.
///
/// Path components are dropped, spaces become underscores and any character
/// outside `[A-Za-z0-9_.-]` is removed. Returns `None` if nothing usable is left.
pub fn secure_filename(filename: &str) -> Option<String> {
    let basename = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = basename
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let cleaned = cleaned.trim_start_matches(['.', '-']).to_string();

    if SAFE_FILENAME_REGEX.is_match(&cleaned) {
        Some(cleaned)
    } else {
        None
    }
}

/// Lowercased extension without the dot, empty if there is none
pub fn file_extension(filename: &str) -> String {
    std::path::Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().trim().to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_string() {
        assert_eq!(clean_string("  oil\r\n sheen   near\tdock "), "oil sheen near dock");
        assert_eq!(clean_string("line\nbreak"), "linebreak");
        assert_eq!(clean_string("   "), "");
    }

    #[test]
    fn test_report_num_regex() {
        assert!(REPORT_NUM_REGEX.is_match("2021-14"));
        assert!(REPORT_NUM_REGEX.is_match("2019-1"));
        assert!(!REPORT_NUM_REGEX.is_match("14"));
        assert!(!REPORT_NUM_REGEX.is_match("2021-"));
        assert!(!REPORT_NUM_REGEX.is_match("21-14"));
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("photo 1.JPG").as_deref(), Some("photo_1.JPG"));
        assert_eq!(
            secure_filename("../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(
            secure_filename("C:\\Users\\me\\report.pdf").as_deref(),
            Some("report.pdf")
        );
        assert_eq!(secure_filename(".hidden").as_deref(), Some("hidden"));
        assert_eq!(secure_filename("../"), None);
        assert_eq!(secure_filename("???"), None);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("photo.JPG"), "jpg");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("README"), "");
    }
}
