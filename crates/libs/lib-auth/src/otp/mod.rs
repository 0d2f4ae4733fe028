//! # One-Time Passcodes
//!
//! Six-digit passcodes emailed during login. A passcode lives on the user
//! row together with its expiry and is cleared after one successful
//! verification or overwritten by the next login attempt.

use chrono::{DateTime, Utc};
use rand::Rng;

/// How long a generated passcode stays valid.
pub const OTP_TTL_MINUTES: i64 = 5;

/// Generate a random six-digit passcode, zero-padded.
pub fn generate_otp() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", n)
}

/// Check a submitted passcode against the stored value and expiry.
pub fn otp_matches(
    submitted: &str,
    stored: Option<&str>,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    match (stored, expires_at) {
        (Some(stored), Some(expires_at)) => stored == submitted.trim() && now <= expires_at,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_generate_otp_shape() {
        for _ in 0..20 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_otp_matches() {
        let now = Utc::now();
        let later = now + Duration::minutes(OTP_TTL_MINUTES);

        assert!(otp_matches("123456", Some("123456"), Some(later), now));
        assert!(otp_matches(" 123456 ", Some("123456"), Some(later), now));
        assert!(!otp_matches("654321", Some("123456"), Some(later), now));
    }

    #[test]
    fn test_otp_expired() {
        let now = Utc::now();
        let earlier = now - Duration::minutes(1);

        assert!(!otp_matches("123456", Some("123456"), Some(earlier), now));
    }

    #[test]
    fn test_otp_absent() {
        let now = Utc::now();
        assert!(!otp_matches("123456", None, None, now));
    }
}
