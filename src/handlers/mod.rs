pub mod appointments;
pub mod doctors;
pub mod health;
pub mod working_hours;

use axum::http::HeaderMap;

use crate::errors::AppError;

/// Guards operator routes with the shared `ADMIN_TOKEN`.
pub(crate) fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() || token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}
