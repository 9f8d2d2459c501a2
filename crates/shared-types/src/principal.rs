//! # Principal
//!
//! Stable caller identifier used by the backend as the permission key.
//!
//! ## Textual Form
//!
//! ```text
//! base32_lower( CRC32_be(bytes) ‖ bytes )  grouped by 5 chars with '-'
//! ```
//!
//! | Class | Bytes | Example |
//! |-------|-------|---------|
//! | Anonymous | `0x04` | `2vxsx-fae` |
//! | Self-authenticating | `SHA-224(DER pubkey) ‖ 0x02` | 63 chars |

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha224};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum principal length in bytes.
pub const MAX_PRINCIPAL_LEN: usize = 29;

const ANONYMOUS_TAG: u8 = 0x04;
const SELF_AUTHENTICATING_TAG: u8 = 0x02;
const CRC_LEN: usize = 4;
const ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

/// Errors parsing a principal from text or bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrincipalError {
    /// Too many bytes.
    #[error("principal too long: {0} bytes > {MAX_PRINCIPAL_LEN}")]
    TooLong(usize),

    /// Not valid lowercase base32.
    #[error("principal text is not valid base32")]
    InvalidBase32,

    /// Too short to carry a checksum.
    #[error("principal text too short")]
    TooShort,

    /// CRC32 prefix does not match the payload.
    #[error("principal checksum mismatch")]
    ChecksumMismatch,

    /// Dash grouping differs from the canonical form.
    #[error("principal text is not in canonical form: expected {expected}")]
    NotCanonical {
        /// Canonical rendering of the decoded bytes
        expected: String,
    },
}

/// Opaque, stable caller identifier.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Principal(Vec<u8>);

impl Principal {
    /// The anonymous principal used by read-only callers.
    pub fn anonymous() -> Self {
        Self(vec![ANONYMOUS_TAG])
    }

    /// Derive the principal that owns a DER-encoded public key.
    pub fn self_authenticating(der_public_key: &[u8]) -> Self {
        let mut bytes = Sha224::digest(der_public_key).to_vec();
        bytes.push(SELF_AUTHENTICATING_TAG);
        Self(bytes)
    }

    /// Build from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PrincipalError> {
        if bytes.len() > MAX_PRINCIPAL_LEN {
            return Err(PrincipalError::TooLong(bytes.len()));
        }
        Ok(Self(bytes.to_vec()))
    }

    /// Parse the canonical textual form.
    pub fn from_text(text: &str) -> Result<Self, PrincipalError> {
        let compact: String = text.chars().filter(|c| *c != '-').collect();
        let decoded = base32_decode(&compact.to_ascii_lowercase())
            .ok_or(PrincipalError::InvalidBase32)?;
        if decoded.len() < CRC_LEN {
            return Err(PrincipalError::TooShort);
        }

        let (crc, bytes) = decoded.split_at(CRC_LEN);
        let principal = Self::from_slice(bytes)?;
        if crc != crc32_be(bytes) {
            return Err(PrincipalError::ChecksumMismatch);
        }

        let expected = principal.to_text();
        if expected != text {
            return Err(PrincipalError::NotCanonical { expected });
        }
        Ok(principal)
    }

    /// Render the canonical textual form.
    pub fn to_text(&self) -> String {
        let mut payload = crc32_be(&self.0).to_vec();
        payload.extend_from_slice(&self.0);

        let encoded = base32_encode(&payload);
        let mut out = String::with_capacity(encoded.len() + encoded.len() / 5);
        for (i, c) in encoded.chars().enumerate() {
            if i > 0 && i % 5 == 0 {
                out.push('-');
            }
            out.push(c);
        }
        out
    }

    /// Raw bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Is this the anonymous principal?
    pub fn is_anonymous(&self) -> bool {
        self.0.as_slice() == [ANONYMOUS_TAG]
    }
}

fn crc32_be(bytes: &[u8]) -> [u8; 4] {
    crc32fast::hash(bytes).to_be_bytes()
}

fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8).div_ceil(5));
    let mut buffer: u32 = 0;
    let mut bits = 0u32;
    for &byte in data {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
        buffer &= (1 << bits) - 1;
    }
    if bits > 0 {
        out.push(ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

fn base32_decode(text: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;
    for c in text.bytes() {
        let value = ALPHABET.iter().position(|&a| a == c)? as u32;
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push(((buffer >> bits) & 0xff) as u8);
        }
        buffer &= (1 << bits) - 1;
    }
    // Leftover padding bits must be zero
    if buffer != 0 {
        return None;
    }
    Some(out)
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({})", self.to_text())
    }
}

impl FromStr for Principal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text())
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Principal::from_text(&text).map_err(serde::de::Error::custom)
    }
}
