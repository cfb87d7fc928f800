use crate::path::{Chain, DerivationScheme};

/// Error types for key derivation and address operations.
#[derive(Debug, thiserror::Error)]
pub enum KeysError {
    /// The requested address kind cannot be derived from the path's chain
    /// (e.g. a payment address from the chimeric account chain).
    #[error("invalid chain for kind: {kind} addresses cannot use the {chain:?} chain")]
    InvalidChainForKind {
        /// Name of the requested address kind.
        kind: &'static str,
        /// The chain the path points at.
        chain: Chain,
    },
    /// The requested address kind is not derivable under the path's scheme
    /// (e.g. a base address under the legacy BIP-44 layout).
    #[error("scheme mismatch: {kind} addresses are not derivable under {scheme:?}")]
    SchemeKindMismatch {
        /// Name of the requested address kind.
        kind: &'static str,
        /// The derivation scheme selected by the path's purpose segment.
        scheme: DerivationScheme,
    },
    /// The path's purpose segment selects no known derivation scheme.
    #[error("unknown derivation purpose {0}")]
    UnknownPurpose(u32),
    /// An address byte payload could not be parsed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    /// An address byte payload had an impossible length.
    #[error("invalid address length {0}")]
    InvalidAddressLength(usize),
    /// A credential was not exactly 28 bytes.
    #[error("invalid credential length {0}, want 28")]
    InvalidCredentialLength(usize),
    /// An underlying primitives error.
    #[error("primitives error: {0}")]
    Primitives(#[from] ada_primitives::PrimitivesError),
}
