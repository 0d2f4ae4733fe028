//! # Authentication Handlers
//!
//! HTTP request handlers for the authentication flow:
//!
//! - signup with email/password
//! - two-step login: password check that emails a one-time passcode, then
//!   passcode verification that issues the session token
//! - session check and logout
//! - profile picture update via the asset host
//!
//! Everything behind these endpoints assumes the session token is presented
//! as `Authorization: Bearer <token>`.

use axum::{
    extract::{Extension, Json, State},
    http::StatusCode,
};
use lib_auth::{
    encode_jwt, generate_otp, hash_password, otp_matches, verify_password, Claims,
    OTP_TTL_MINUTES,
};
use lib_core::dto::{
    AuthResponse, ErrorResponse, MessageResponse, SignupRequest, UpdateProfileRequest, UserInfo,
    VerifyOtpRequest, VerifyPasswordRequest,
};
use lib_core::model::store::models::UserForCreate;
use lib_core::model::store::UserRepository;
use lib_core::{Config, DbPool};
use lib_utils::time::{minutes_from_now, now_utc};
use lib_utils::validation::validate_email;
use tracing::{debug, error, info, instrument, warn};

use crate::server::AppState;

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn reject(status: StatusCode, message: &str) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Signup handler - creates a new user account and issues a session token.
///
/// # Validation
///
/// - Full name, email and password must be present
/// - Email must look like an email and be unique
/// - Password must be at least 6 characters (validated in `hash_password`)
#[instrument(skip(pool, config, req), fields(email = %req.email))]
pub async fn signup(
    State(pool): State<DbPool>,
    State(config): State<Config>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), HandlerError> {
    info!("[SIGNUP] New signup request");

    if req.full_name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        warn!("[SIGNUP] Missing fields");
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "Name, email and password are required",
        ));
    }

    if let Err(e) = validate_email(&req.email) {
        warn!("[SIGNUP] Invalid email format");
        return Err(reject(StatusCode::BAD_REQUEST, &e));
    }

    match UserRepository::find_by_email(&pool, &req.email).await {
        Ok(Some(_)) => {
            warn!("[SIGNUP] Email already registered: {}", req.email);
            return Err(reject(StatusCode::CONFLICT, "Email already exists"));
        }
        Ok(None) => {}
        Err(e) => {
            error!("[SIGNUP] Database error checking email: {}", e);
            return Err(reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ));
        }
    }

    let password_hash = match hash_password(&req.password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("[SIGNUP] Password rejected: {}", e);
            return Err(reject(StatusCode::BAD_REQUEST, &e));
        }
    };

    let user = match UserRepository::create(
        &pool,
        UserForCreate::new(req.email.clone(), req.full_name.trim().to_string(), password_hash),
    )
    .await
    {
        Ok(user) => user,
        Err(e) => {
            error!("[SIGNUP] Failed to create user: {}", e);
            return Err(reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create user",
            ));
        }
    };

    let token = match encode_jwt(user.id, &config.jwt_secret, config.jwt_expiration_hours) {
        Ok(token) => token,
        Err(e) => {
            error!("[SIGNUP] Token encoding failed: {}", e);
            return Err(reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate token",
            ));
        }
    };

    info!("[SIGNUP] User {} created", user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserInfo::from(user),
            token,
            message: "Signup successful".to_string(),
        }),
    ))
}

/// Login step 1 - verify the password and email a one-time passcode.
///
/// Each attempt regenerates the passcode; the previous one is overwritten.
#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn verify_password_and_send_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyPasswordRequest>,
) -> Result<Json<MessageResponse>, HandlerError> {
    info!("[LOGIN] Password verification attempt");

    let user = match UserRepository::find_by_email(&state.db, &req.email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("[LOGIN] Unknown email");
            return Err(reject(StatusCode::UNAUTHORIZED, "Invalid credentials"));
        }
        Err(e) => {
            error!("[LOGIN] Database error: {}", e);
            return Err(reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ));
        }
    };

    match verify_password(&req.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            warn!("[LOGIN] Invalid password for user {}", user.id);
            return Err(reject(StatusCode::UNAUTHORIZED, "Invalid credentials"));
        }
        Err(e) => {
            error!("[LOGIN] Password verification error: {}", e);
            return Err(reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ));
        }
    }

    let otp = generate_otp();
    let expires_at = minutes_from_now(OTP_TTL_MINUTES);

    if let Err(e) = UserRepository::set_otp(&state.db, user.id, &otp, expires_at).await {
        error!("[LOGIN] Failed to store passcode: {}", e);
        return Err(reject(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
        ));
    }

    let body = format!(
        "Your one-time passcode is {otp}. It expires in {OTP_TTL_MINUTES} minutes."
    );
    if let Err(e) = state.mailer.send(&user.email, "Your login code", &body).await {
        // Detail stays in the logs; the caller gets a generic message.
        error!("[LOGIN] Passcode email failed: {}", e);
        return Err(reject(
            StatusCode::BAD_GATEWAY,
            "Service temporarily unavailable",
        ));
    }

    debug!("[LOGIN] Passcode issued for user {}", user.id);

    Ok(Json(MessageResponse {
        message: "OTP sent to your email".to_string(),
    }))
}

/// Login step 2 - verify the passcode and issue the session token.
///
/// The stored passcode is cleared after one successful use.
#[instrument(skip(pool, config, req), fields(email = %req.email))]
pub async fn verify_otp(
    State(pool): State<DbPool>,
    State(config): State<Config>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<AuthResponse>, HandlerError> {
    info!("[LOGIN] Passcode verification attempt");

    let user = match UserRepository::find_by_email(&pool, &req.email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("[LOGIN] Unknown email");
            return Err(reject(StatusCode::UNAUTHORIZED, "Invalid credentials"));
        }
        Err(e) => {
            error!("[LOGIN] Database error: {}", e);
            return Err(reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ));
        }
    };

    if !otp_matches(&req.otp, user.otp.as_deref(), user.otp_expires_at, now_utc()) {
        warn!("[LOGIN] Invalid or expired passcode for user {}", user.id);
        return Err(reject(
            StatusCode::UNAUTHORIZED,
            "Invalid or expired passcode",
        ));
    }

    if let Err(e) = UserRepository::clear_otp(&pool, user.id).await {
        error!("[LOGIN] Failed to clear passcode: {}", e);
        return Err(reject(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
        ));
    }

    let token = match encode_jwt(user.id, &config.jwt_secret, config.jwt_expiration_hours) {
        Ok(token) => token,
        Err(e) => {
            error!("[LOGIN] Token encoding failed: {}", e);
            return Err(reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate token",
            ));
        }
    };

    info!("[LOGIN] User {} authenticated", user.id);

    Ok(Json(AuthResponse {
        user: UserInfo::from(user),
        token,
        message: "Login successful".to_string(),
    }))
}

/// Logout - acknowledgement only; the session token is discarded
/// client-side.
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    })
}

/// Session check - return the authenticated user's public record.
pub async fn check(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserInfo>, HandlerError> {
    let user_id = claims
        .user_id()
        .map_err(|_| reject(StatusCode::UNAUTHORIZED, "Invalid session"))?;

    match UserRepository::find_by_id(&pool, user_id).await {
        Ok(Some(user)) => Ok(Json(UserInfo::from(user))),
        Ok(None) => Err(reject(StatusCode::NOT_FOUND, "User not found")),
        Err(e) => {
            error!("[CHECK] Database error: {}", e);
            Err(reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ))
        }
    }
}

/// Update the profile picture. The image is uploaded to the asset host and
/// only the returned URL is stored.
#[instrument(skip(state, claims, req))]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserInfo>, HandlerError> {
    let user_id = claims
        .user_id()
        .map_err(|_| reject(StatusCode::UNAUTHORIZED, "Invalid session"))?;

    if req.profile_pic.trim().is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "Profile pic is required"));
    }

    let url = match state.assets.upload(&req.profile_pic).await {
        Ok(url) => url,
        Err(e) => {
            error!("[PROFILE] Asset upload failed: {}", e);
            return Err(reject(
                StatusCode::BAD_GATEWAY,
                "Service temporarily unavailable",
            ));
        }
    };

    match UserRepository::set_profile_pic(&state.db, user_id, &url).await {
        Ok(user) => Ok(Json(UserInfo::from(user))),
        Err(e) => {
            error!("[PROFILE] Database error: {}", e);
            Err(reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ))
        }
    }
}
