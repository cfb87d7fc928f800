//! Transaction submission interfaces.
//!
//! Submission itself is an external collaborator; this module defines
//! the seam. Submitters are expected to be idempotent keyed by
//! transaction id, so a retry after a crash cannot double-spend.

use crate::builder::FinalizedTx;

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct SubmitSuccess {
    /// The transaction id accepted by the network.
    pub tx_id: String,
    /// Human-readable status message from the submitter.
    pub message: String,
}

/// Result of a failed submission.
#[derive(Debug, Clone)]
pub struct SubmitFailure {
    /// Machine-readable error code from the submitter.
    pub code: String,
    /// Human-readable description of the failure.
    pub description: String,
}

impl std::fmt::Display for SubmitFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description)
    }
}

impl std::error::Error for SubmitFailure {}

/// Trait for submitting finalized transactions to the network.
pub trait Submitter {
    /// Submit a finalized transaction.
    ///
    /// # Returns
    /// `Ok(SubmitSuccess)` on acceptance, or `Err` with the failure.
    fn submit(&self, tx: &FinalizedTx) -> Result<SubmitSuccess, SubmitFailure>;
}

/// A submitter wrapper that checks each transaction against an injected
/// comparator before forwarding it.
///
/// Tests that need to assert on the exact transaction reaching the
/// network inject their expectation here instead of relying on any
/// process-wide hook.
pub struct ComparingSubmitter<S> {
    inner: S,
    comparator: Box<dyn Fn(&FinalizedTx) -> bool + Send + Sync>,
}

impl<S: Submitter> ComparingSubmitter<S> {
    /// Wrap a submitter with an expectation.
    ///
    /// # Arguments
    /// * `inner` - The submitter that receives matching transactions.
    /// * `comparator` - Returns `true` for transactions that may pass.
    pub fn new(
        inner: S,
        comparator: impl Fn(&FinalizedTx) -> bool + Send + Sync + 'static,
    ) -> Self {
        ComparingSubmitter {
            inner,
            comparator: Box::new(comparator),
        }
    }
}

impl<S: Submitter> Submitter for ComparingSubmitter<S> {
    fn submit(&self, tx: &FinalizedTx) -> Result<SubmitSuccess, SubmitFailure> {
        if !(self.comparator)(tx) {
            return Err(SubmitFailure {
                code: "unexpected-transaction".into(),
                description: format!("transaction {} did not match the expectation", tx.tx_id),
            });
        }
        self.inner.submit(tx)
    }
}
