//! String-to-typed-value coercion for recognized properties.
//!
//! Conversions are strict by design: anything short of an exact literal is
//! a [`MailError::Conversion`] naming the property, the offending value and
//! the expected type, so the error can be shown to a user as-is.

use crate::MailError;

/// Parse a boolean property.
///
/// Accepts exactly `true` or `false`, ASCII case-insensitive. Surrounding
/// whitespace is not stripped; `"True "` fails.
pub fn parse_bool(property: &str, value: &str) -> Result<bool, MailError> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(conversion(property, value, "boolean"))
    }
}

/// Parse an integer property.
///
/// Accepts an optional leading sign followed by digits within `i32` range.
/// Non-numeric and non-integral inputs (`"3.1415"`) fail.
pub fn parse_int(property: &str, value: &str) -> Result<i32, MailError> {
    value
        .parse::<i32>()
        .map_err(|_| conversion(property, value, "integer"))
}

fn conversion(property: &str, value: &str, expected: &'static str) -> MailError {
    MailError::Conversion {
        property: property.to_string(),
        value: value.to_string(),
        expected,
    }
}
