//! Short tokens
//!
//! A token is the base64url (padded) form of the minimal big-endian bytes of a link ID. IDs
//! below 256 fit in a single byte, so `1` becomes `AQ==` and `73` becomes `SQ==`.
//!
//! IDs are limited to 63 bits, the range of the `BIGINT` key in Postgres.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::DecodePaddingMode;
use base64::engine::GeneralPurpose;
use base64::engine::GeneralPurposeConfig;
use thiserror::Error;

/// Largest ID a token can carry
pub const MAX_ID: u64 = i64::MAX.unsigned_abs();

/// Padded on encode, lenient about padding and trailing bits on decode
const CONFIG: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);

/// URL-safe alphabet
const URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, CONFIG);

/// Standard alphabet, only used to decode tokens containing `+` or `/`
const STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, CONFIG);

/// Reasons a token does not map to an ID
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Not base64 in either alphabet
    #[error("Token is not valid base64")]
    InvalidBase64,

    /// Valid base64, but without any bytes
    #[error("Token is empty")]
    Empty,

    /// More bits than an ID can hold
    #[error("Token does not fit in a link ID")]
    Overflow,
}

/// Encode a link ID into its short token
pub fn encode(id: u64) -> String {
    let bytes = id.to_be_bytes();

    // keep at least one byte, so `0` is `AA==` and not an empty token
    let skip = bytes
        .iter()
        .take(bytes.len() - 1)
        .take_while(|byte| **byte == 0)
        .count();

    URL_SAFE.encode(&bytes[skip..])
}

/// Decode a short token back into a link ID
///
/// # Errors
///
/// Will return `Err` if the token is not base64, holds no bytes, or does not fit in [`MAX_ID`]
pub fn decode(token: &str) -> Result<u64, DecodeError> {
    let bytes = URL_SAFE
        .decode(token)
        .or_else(|_| STANDARD.decode(token))
        .map_err(|_| DecodeError::InvalidBase64)?;

    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    // leading zero bytes do not change the value
    let significant = bytes
        .iter()
        .position(|byte| *byte != 0)
        .map_or(&bytes[bytes.len() - 1..], |start| &bytes[start..]);

    if significant.len() > 8 {
        return Err(DecodeError::Overflow);
    }

    let id = significant
        .iter()
        .fold(0u64, |id, byte| (id << 8) | u64::from(*byte));

    if id > MAX_ID {
        return Err(DecodeError::Overflow);
    }

    Ok(id)
}
