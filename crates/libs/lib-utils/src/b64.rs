//! # Base64 / Data URI Helpers
//!
//! Clients submit images as `data:<mime>;base64,<payload>` strings. These
//! helpers split and validate that form so the upload and generation
//! collaborators can work with the raw payload.

use base64::{engine::general_purpose, Engine as _};

/// Encode bytes to a standard base64 string.
pub fn b64_encode(content: impl AsRef<[u8]>) -> String {
    general_purpose::STANDARD.encode(content)
}

/// Decode a standard base64 string to bytes.
pub fn b64_decode(b64: &str) -> Result<Vec<u8>, Error> {
    general_purpose::STANDARD
        .decode(b64)
        .map_err(|_| Error::FailToB64Decode)
}

/// Split a `data:` URI into `(mime_type, base64_payload)`.
///
/// The payload is decoded once to verify it is valid base64; the string form
/// is returned since both collaborators consume base64.
pub fn split_data_uri(uri: &str) -> Result<(String, String), Error> {
    let rest = uri.strip_prefix("data:").ok_or(Error::NotADataUri)?;
    let (mime, payload) = rest.split_once(";base64,").ok_or(Error::NotADataUri)?;
    if mime.is_empty() {
        return Err(Error::NotADataUri);
    }
    b64_decode(payload)?;
    Ok((mime.to_string(), payload.to_string()))
}

// region:    --- Error
#[derive(Debug, PartialEq)]
pub enum Error {
    FailToB64Decode,
    NotADataUri,
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{self:?}")
    }
}

impl std::error::Error for Error {}
// endregion: --- Error
