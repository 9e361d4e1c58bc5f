use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::{names, rejections::AppError, services::auth::Claims, AppState};

/// Guard extractor that verifies the `Authorization: Bearer <token>` header
/// and carries the decoded claims for use in handlers.
pub struct AuthGuard(pub Claims);

impl FromRequestParts<AppState> for AuthGuard {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized(names::MSG_NO_TOKEN))?;

        let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
        if token.is_empty() {
            return Err(AppError::Unauthorized(names::MSG_NO_TOKEN));
        }

        match state.auth.verify_token(token) {
            Some(claims) => Ok(AuthGuard(claims)),
            None => Err(AppError::Unauthorized(names::MSG_INVALID_TOKEN)),
        }
    }
}
