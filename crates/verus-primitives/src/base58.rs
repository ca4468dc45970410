//! Base58Check encoding and decoding.
//!
//! Verus addresses (i-addresses, R-addresses) are Base58Check strings:
//! a version byte plus payload, with a 4-byte double-SHA-256 checksum
//! appended before Base58 encoding.

use sha2::{Digest, Sha256};

use crate::PrimitivesError;

/// Compute SHA-256 of the input data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute double SHA-256 (SHA-256d) of the input data.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Encode a byte slice with a 4-byte double-SHA-256 checksum appended.
pub fn check_encode(data: &[u8]) -> String {
    let checksum = sha256d(data);
    let mut payload = data.to_vec();
    payload.extend_from_slice(&checksum[..4]);
    bs58::encode(payload).into_string()
}

/// Decode a Base58Check string, verifying the 4-byte checksum.
///
/// Returns the payload (version byte included, checksum stripped).
pub fn check_decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let decoded = bs58::decode(s)
        .into_vec()
        .map_err(|e| PrimitivesError::InvalidBase58(e.to_string()))?;
    if decoded.len() < 4 {
        return Err(PrimitivesError::InvalidBase58(
            "data too short for checksum".to_string(),
        ));
    }
    let (payload, checksum) = decoded.split_at(decoded.len() - 4);
    let expected = sha256d(payload);
    if checksum != &expected[..4] {
        return Err(PrimitivesError::ChecksumMismatch);
    }
    Ok(payload.to_vec())
}
