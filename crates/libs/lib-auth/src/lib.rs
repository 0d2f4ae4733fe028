//! # Authentication Library
//!
//! Password hashing, session token management, and one-time passcodes.

pub mod otp;
pub mod pwd;
pub mod token;

// Re-export commonly used types
pub use otp::{generate_otp, otp_matches, OTP_TTL_MINUTES};
pub use pwd::{hash_password, verify_password};
pub use token::{decode_jwt, encode_jwt, Claims};
