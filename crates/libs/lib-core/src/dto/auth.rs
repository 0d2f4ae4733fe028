//! # Authentication Data Transfer Objects
//!
//! Request and response structures for the auth endpoints:
//!
//! - `POST /api/auth/signup` - [`SignupRequest`] -> [`AuthResponse`]
//! - `POST /api/auth/verify-password` - [`VerifyPasswordRequest`] -> message
//! - `POST /api/auth/verify-otp` - [`VerifyOtpRequest`] -> [`AuthResponse`]
//! - `GET  /api/auth/check` - [`UserInfo`]
//! - `PUT  /api/auth/update-profile` - [`UpdateProfileRequest`] -> [`UserInfo`]

use serde::{Deserialize, Serialize};

use crate::model::store::models::User;

/// Signup request payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

/// First login step: password check that triggers an OTP email.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPasswordRequest {
    pub email: String,
    pub password: String,
}

/// Second login step: passcode verification.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

/// Profile update payload. The picture is a base64 `data:` URI that gets
/// uploaded to the asset host before the URL is stored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub profile_pic: String,
}

/// Public user record, credential and OTP fields stripped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub profile_pic: String,
    pub created_at: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            profile_pic: user.profile_pic,
            created_at: lib_utils::time::format_time(user.created_at),
        }
    }
}

/// Successful signup / OTP verification response.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: UserInfo,
    pub token: String,
    pub message: String,
}

/// Plain message response (logout, verify-password).
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Standard error body, also produced by `AppError::into_response`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
