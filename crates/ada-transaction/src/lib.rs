/// Cardano wallet SDK - Transaction building and encoding.
///
/// Provides the unsigned transaction model with its lifecycle state
/// machine, linear fee computation, certificate sequencing, canonical
/// body encoding with transaction ids, the transaction builder
/// orchestrating input selection and the fee/change fixed point, and
/// the submission seam.

pub mod params;
pub mod fees;
pub mod certificate;
pub mod tx;
pub mod encode;
pub mod builder;
pub mod submit;

mod error;
pub use error::BuildError;

pub use builder::{BuildRequest, FinalizedTx, PendingBuild, TransactionBuilder, TxTarget};
pub use certificate::{AttachedCertificate, Certificate, PoolKeyHash};
pub use fees::LinearFee;
pub use params::ProtocolParams;
pub use submit::{ComparingSubmitter, SubmitFailure, SubmitSuccess, Submitter};
pub use tx::{BuildWarning, TxOutput, TxState, UnsignedTx};
