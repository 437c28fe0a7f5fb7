//! Error taxonomy for a reconciliation run.
//!
//! Only `DataFetch` is fatal: without upstream data there is nothing to
//! analyze. Every other variant degrades to "no activity for the affected
//! vessel or event" and must never abort the batch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// Upstream reading/ticket retrieval failed. Fatal to the whole run.
    #[error("upstream data fetch failed: {source}")]
    DataFetch {
        #[source]
        source: anyhow::Error,
    },

    /// A vessel's series is shorter than the smoothing windows require.
    /// Recoverable: the vessel is skipped for the run.
    #[error("series for {vessel_id} too short: {samples} samples, {required} required")]
    InsufficientSeries {
        vessel_id: String,
        samples: usize,
        required: usize,
    },

    /// A ticket arrived without its required fields. Recoverable: the ticket
    /// is excluded from the index.
    #[error("malformed ticket {ticket_id}: {reason}")]
    MalformedTicket { ticket_id: String, reason: String },

    /// The combinatorial phase exceeded its subset budget for one event.
    /// Recoverable: the event stays unmatched.
    #[error("combinatorial search gave up after examining {explored} subsets")]
    CombinatorialExhaustion { explored: usize },
}

impl ReconError {
    /// Whether this error must abort the batch instead of degrading to a
    /// skipped vessel or event.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DataFetch { .. })
    }
}
