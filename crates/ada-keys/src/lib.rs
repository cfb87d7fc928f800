/// Cardano wallet SDK - HD key derivation and addresses.
///
/// Defines the hierarchical-deterministic path model (BIP-44 and
/// CIP-1852 layouts), deterministic credential derivation from a wallet
/// seed, and the address sum type covering every supported kind.

pub mod path;
pub mod derive;
pub mod address;

#[cfg(feature = "test-utils")]
pub mod test_util;

mod error;
pub use error::KeysError;

pub use address::{Address, AddressKind, ChainPointer, Credential, Network};
pub use derive::KeyDeriver;
pub use path::{Chain, DerivationScheme, HdPath};
