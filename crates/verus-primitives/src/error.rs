//! Error types for primitive encoding and decoding.

/// Errors that can occur while encoding or decoding request primitives.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    /// Ran out of bytes while decoding.
    #[error("unexpected end of data")]
    UnexpectedEof,

    /// Base58 decoding failed.
    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    /// Base58Check checksum did not match.
    #[error("base58check checksum mismatch")]
    ChecksumMismatch,

    /// An identity reference could not be parsed.
    #[error("invalid identity reference: {0}")]
    InvalidAddress(String),

    /// A JSON view could not be parsed into a record.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// A hex-encoded field could not be decoded.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// A field held a value outside its legal range.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// An envelope marked signed was serialized without signature bytes.
    #[error("envelope is marked signed but carries no signature bytes")]
    MissingSignature,

    /// A detail entry carried an unknown kind ordinal.
    #[error("unknown detail kind ordinal: {0}")]
    UnknownDetailKind(u64),

    /// A deeplink URI was malformed.
    #[error("invalid deeplink URI: {0}")]
    InvalidDeeplink(String),
}

impl From<serde_json::Error> for PrimitivesError {
    fn from(e: serde_json::Error) -> Self {
        PrimitivesError::InvalidJson(e.to_string())
    }
}
