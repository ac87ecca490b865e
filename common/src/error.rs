//! Error taxonomy for the aggregation pipeline.
//!
//! Per-signal and per-source failures are absorbed where they occur and
//! surface only as `RunCoverage` counts; `InvalidConfiguration` is the one
//! fatal variant and is raised before any signal processing begins.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignalError {
    /// The scorer could not produce a confident result for this document.
    /// Recovered locally: the signal is dropped, the run continues.
    #[error("signal from {source} could not be scored: {reason}")]
    UnscoredSignal { source: String, reason: String },

    /// A mention could not be mapped to a canonical entity. Recovered
    /// locally: the mention is dropped.
    #[error("mention {mention:?} does not resolve to a known entity")]
    UnresolvedEntity { mention: String },

    /// An external source timed out or errored. The source contributes zero
    /// signals for the run and is listed in the synthesis coverage.
    #[error("source {source} unavailable: {reason}")]
    SourceUnavailable { source: String, reason: String },

    /// A threshold or required mapping is missing or malformed. Fatal.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },
}

impl SignalError {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        SignalError::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}
