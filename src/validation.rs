use crate::error::{AppError, AppResult};

// =============================================================================
// Validation Constants
// =============================================================================

/// Maximum length for site and post display names.
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum length for URL slugs.
pub const MAX_SLUG_LENGTH: usize = 128;

/// Maximum length for submitted URLs.
pub const MAX_URL_LENGTH: usize = 2048;

/// Maximum length for post titles.
pub const MAX_TITLE_LENGTH: usize = 256;

/// Validate a human-facing name (site name, author name).
///
/// Rules:
/// - Between 1 and 255 characters
/// - No control characters
pub fn validate_name(name: &str, field: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{field} cannot be empty")));
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(AppError::BadRequest(format!(
            "{field} cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }

    if name.chars().any(char::is_control) {
        return Err(AppError::BadRequest(format!(
            "{field} contains control characters"
        )));
    }

    Ok(())
}

/// Validate a URL slug.
///
/// Rules:
/// - Between 1 and 128 characters
/// - Lowercase ASCII letters, digits, and hyphens only
/// - Must start and end with a letter or digit
/// - No consecutive hyphens
pub fn validate_slug(slug: &str) -> AppResult<()> {
    if slug.is_empty() {
        return Err(AppError::BadRequest("slug cannot be empty".to_string()));
    }

    if slug.len() > MAX_SLUG_LENGTH {
        return Err(AppError::BadRequest(format!(
            "slug cannot exceed {MAX_SLUG_LENGTH} characters"
        )));
    }

    let valid_chars = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid_chars {
        return Err(AppError::BadRequest(
            "slug may only contain lowercase letters, digits, and hyphens".to_string(),
        ));
    }

    let starts_ok = slug.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
    let ends_ok = slug.chars().last().is_some_and(|c| c.is_ascii_alphanumeric());
    if !starts_ok || !ends_ok {
        return Err(AppError::BadRequest(
            "slug must start and end with a letter or digit".to_string(),
        ));
    }

    if slug.contains("--") {
        return Err(AppError::BadRequest(
            "slug cannot contain consecutive hyphens".to_string(),
        ));
    }

    Ok(())
}

/// Validate a submitted site URL.
///
/// Rules:
/// - Must start with `http://` or `https://`
/// - Must have a non-empty host
/// - No whitespace, length capped
pub fn validate_url(url: &str) -> AppResult<()> {
    if url.len() > MAX_URL_LENGTH {
        return Err(AppError::BadRequest(format!(
            "url cannot exceed {MAX_URL_LENGTH} characters"
        )));
    }

    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| {
            AppError::BadRequest("url must start with http:// or https://".to_string())
        })?;

    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    if host.is_empty() {
        return Err(AppError::BadRequest("url must include a host".to_string()));
    }

    if url.chars().any(char::is_whitespace) {
        return Err(AppError::BadRequest("url cannot contain whitespace".to_string()));
    }

    Ok(())
}

/// Validate a blog post title.
pub fn validate_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::BadRequest("title cannot be empty".to_string()));
    }

    if title.len() > MAX_TITLE_LENGTH {
        return Err(AppError::BadRequest(format!(
            "title cannot exceed {MAX_TITLE_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Derive a catalog slug from a site URL's host.
///
/// `https://www.example.co.uk/page` becomes `www-example-co-uk`. Returns
/// `None` when the URL has no usable host; callers validate first.
pub fn slug_from_url(url: &str) -> Option<String> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;

    let host = rest.split(['/', '?', '#']).next()?;
    let host = host.split(':').next()?;
    if host.is_empty() {
        return None;
    }

    Some(host.to_lowercase().replace('.', "-"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_accepts_normal_names() {
        assert!(validate_name("Example Site", "name").is_ok());
    }

    #[test]
    fn test_validate_name_rejects_empty() {
        assert!(validate_name("", "name").is_err());
        assert!(validate_name("   ", "name").is_err());
    }

    #[test]
    fn test_validate_name_rejects_too_long() {
        assert!(validate_name(&"x".repeat(256), "name").is_err());
    }

    #[test]
    fn test_validate_slug_accepts_valid() {
        assert!(validate_slug("my-site-42").is_ok());
        assert!(validate_slug("a").is_ok());
    }

    #[test]
    fn test_validate_slug_rejects_invalid() {
        assert!(validate_slug("").is_err());
        assert!(validate_slug("UPPER").is_err());
        assert!(validate_slug("has space").is_err());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug("trailing-").is_err());
        assert!(validate_slug("double--hyphen").is_err());
    }

    #[test]
    fn test_validate_url_accepts_http_and_https() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://example.com/path?q=1").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_bad_schemes() {
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("example.com").is_err());
    }

    #[test]
    fn test_validate_url_rejects_empty_host() {
        assert!(validate_url("https://").is_err());
        assert!(validate_url("https:///path").is_err());
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("A fine post").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title(&"x".repeat(300)).is_err());
    }

    #[test]
    fn test_slug_from_url() {
        assert_eq!(
            slug_from_url("https://www.example.com/page").as_deref(),
            Some("www-example-com")
        );
        assert_eq!(
            slug_from_url("http://Example.COM:8080").as_deref(),
            Some("example-com")
        );
        assert_eq!(slug_from_url("https://"), None);
        assert_eq!(slug_from_url("not-a-url"), None);
    }
}
