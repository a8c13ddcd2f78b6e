use serde_json::Value;

use crate::error::ApiError;

pub const MIN_PASSWORD_CHARS: usize = 6;

/// A field counts as supplied only when present and non-empty.
pub(crate) fn present(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.is_empty())
}

/// Reads `userId` from a body that may carry it as a number or a numeric string.
///
/// `Ok(None)` means the caller should treat it as missing (absent, null, empty, zero).
pub(crate) fn parse_user_id(raw: Option<&Value>) -> Result<Option<i32>, ApiError> {
    let invalid = || ApiError::bad_request("User ID must be an integer");
    let id = match raw {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => i,
            // `1.0` is the same number as `1` on the wire.
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= i32::MAX as f64)
                .map(|f| f as i64)
                .ok_or_else(invalid)?,
        },
        Some(Value::String(s)) if s.is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| invalid())?,
        Some(_) => return Err(invalid()),
    };
    if id == 0 {
        return Ok(None);
    }
    i32::try_from(id).map(Some).map_err(|_| invalid())
}

/// Length is counted in UTF-16 code units, so characters outside the BMP count twice.
pub(crate) fn check_new_password(password: &str) -> Result<(), ApiError> {
    if password.encode_utf16().count() < MIN_PASSWORD_CHARS {
        return Err(ApiError::bad_request(format!(
            "New password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }
    Ok(())
}

/// Credential check against the stored value.
///
/// SECURITY: passwords are stored and compared as plain text. Switching to a
/// hash changes the stored format and is a product decision, not a drive-by fix.
pub(crate) fn password_matches(stored: &str, supplied: &str) -> bool {
    stored == supplied
}
