/// Error types for primitive operations.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    /// A hash value had the wrong length or could not be parsed.
    #[error("invalid hash: {0}")]
    InvalidHash(String),
    /// Hex decoding failed (forwarded from the `hex` crate).
    #[error("hex error: {0}")]
    Hex(#[from] hex::FromHexError),
}
