//! Free-text cleanup and identity normalization for property fields.

/// Trims surrounding whitespace and drops angle brackets from free text.
pub fn sanitize_text(value: &str) -> String {
    value.trim().replace(['<', '>'], "")
}

/// Canonical suburb key used for storage, filtering, and averaging.
pub fn normalize_suburb(value: &str) -> String {
    sanitize_text(value).trim().to_lowercase()
}

/// Canonical state code (upper-cased).
pub fn normalize_state(value: &str) -> String {
    sanitize_text(value).trim().to_uppercase()
}

/// Sanitizes an optional field, treating blank results as absent.
pub(crate) fn sanitize_optional(value: Option<&str>, normalize: fn(&str) -> String) -> Option<String> {
    value.map(normalize).filter(|cleaned| !cleaned.is_empty())
}
