//! # Authentication Middleware
//!
//! Validates the session token on protected routes and injects the verified
//! [`Claims`] into request extensions. Everything behind this middleware can
//! assume a verified current user id is available per request:
//!
//! ```rust,ignore
//! async fn handler(Extension(claims): Extension<Claims>) -> Result<..., AppError> {
//!     let user_id = claims.user_id().map_err(AppError::Unauthorized)?;
//!     // ...
//! }
//! ```

use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
};
use lib_auth::decode_jwt;
use lib_core::config::core_config;
use tracing::{debug, warn};

/// Authentication middleware that validates session tokens.
///
/// - **Valid token**: continues with `Claims` in request extensions
/// - **Missing/invalid token**: returns `401 Unauthorized`
pub async fn require_auth(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            warn!("[AUTH] Missing Authorization header");
            StatusCode::UNAUTHORIZED
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("[AUTH] Invalid Authorization header format");
        StatusCode::UNAUTHORIZED
    })?;

    let config = core_config();
    let claims = decode_jwt(token, &config.jwt_secret).map_err(|e| {
        warn!("[AUTH] Session token validation failed: {}", e);
        StatusCode::UNAUTHORIZED
    })?;

    debug!("[AUTH] Authenticated user id {}", claims.sub);

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
