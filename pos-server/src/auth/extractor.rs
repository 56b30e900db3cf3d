//! JWT Extractors
//!
//! - [`CurrentUser`]: access token, reused from the middleware when present
//! - [`SpecialAccess`]: bootstrap token issued by `admin-access`

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::AppError;
use crate::auth::jwt::TOKEN_TYPE_SPECIAL;
use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;
use shared::error::ErrorCode;

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header")),
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
            Err(AppError::unauthorized())
        }
    }
}

fn map_jwt_error(e: JwtError, parts: &Parts) -> AppError {
    security_log!(
        "WARN",
        "auth_failed",
        error = format!("{}", e),
        uri = format!("{:?}", parts.uri)
    );
    match e {
        JwtError::ExpiredToken => AppError::token_expired(),
        _ => AppError::invalid_token("Invalid token"),
    }
}

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Check if already extracted (from middleware)
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let token = bearer_token(parts)?;
        let jwt_service = state.get_jwt_service();
        let user = jwt_service
            .validate_token(token)
            .and_then(CurrentUser::try_from)
            .map_err(|e| map_jwt_error(e, parts))?;

        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// Proof of a valid special access token
#[derive(Debug, Clone, Copy)]
pub struct SpecialAccess;

impl FromRequestParts<ServerState> for SpecialAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state
            .get_jwt_service()
            .validate_token(token)
            .map_err(|e| map_jwt_error(e, parts))?;

        if claims.token_type != TOKEN_TYPE_SPECIAL {
            security_log!("WARN", "special_access_denied", sub = claims.sub.clone());
            return Err(AppError::new(ErrorCode::SpecialAccessRequired));
        }

        Ok(SpecialAccess)
    }
}
