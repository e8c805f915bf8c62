//! Shared constants used across Formatki crates.

use std::time::Duration;

/// Category that has no GT/KW stages; it is generated from the category alone.
pub const LIGHTING_CATEGORY: &str = "Oświetlenie";

/// How long a status message stays visible before it clears itself.
pub const MESSAGE_TTL: Duration = Duration::from_secs(180);

/// Default base URL of the generation service.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Filename reported when the service omits one.
pub const DEFAULT_GENERATED_FILENAME: &str = "formatki.xlsx";

/// File holding the remembered email inside the state directory.
pub const LAST_EMAIL_FILE_NAME: &str = "last_email";

/// Returns `true` for the lighting category.
///
/// The comparison ignores surrounding whitespace and case, matching how the
/// service treats the category.
pub fn is_lighting(category: &str) -> bool {
    category.trim().to_lowercase() == LIGHTING_CATEGORY.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::is_lighting;

    #[test]
    fn lighting_detection_ignores_case_and_padding() {
        assert!(is_lighting("Oświetlenie"));
        assert!(is_lighting("  oświetlenie "));
        assert!(is_lighting("OŚWIETLENIE"));
        assert!(!is_lighting("Ogród"));
        assert!(!is_lighting(""));
    }
}
