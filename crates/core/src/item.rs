//! Item field rules shared by the DTO validators and the repositories.

use validator::{ValidateUrl, ValidationError};

/// Trim `value` and map blank strings to `None`.
///
/// Optional item fields accept `""` from clients to mean "no value".
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validator for optional image references: empty, or an absolute URL.
pub fn validate_image_url(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || value.trim().validate_url() {
        Ok(())
    } else {
        Err(ValidationError::new("url").with_message("Image must be a valid URL".into()))
    }
}

/// Escape `%`, `_` and `\` so user text is matched literally inside `ILIKE`.
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
