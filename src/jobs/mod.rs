pub mod gold;
pub mod news;
pub mod opinions;

/// How a single pipeline run ended.
///
/// Every run is linear: fetch, extract, optionally derive, persist. A
/// failed fetch or persist surfaces as a [`crate::error::JobError`]; an
/// empty extraction short-circuits to `Skipped` with nothing persisted.
/// No partial persistence is ever attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// A document was written covering this many records
    Stored { count: usize },
    /// The run ended early with nothing persisted
    Skipped { reason: String },
}

impl JobOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        JobOutcome::Skipped {
            reason: reason.into(),
        }
    }
}
