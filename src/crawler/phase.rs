/// Crawl phase definitions for the coordinator state machine
///
/// Discovery runs go `Idle -> FetchingSeed -> FetchingBatch -> Completed`,
/// or stop at `FailedEarly` when the seed cannot be fetched. List runs skip
/// the seed phase and go straight from `Idle` to `FetchingBatch`.
use std::fmt;

/// Represents where a crawl run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Nothing dispatched yet
    Idle,

    /// Fetching the discovery seed alone
    FetchingSeed,

    /// Fetching the work queue with bounded concurrency
    FetchingBatch,

    /// Every dispatched fetch has resolved
    Completed,

    /// The discovery seed failed; nothing could be discovered
    FailedEarly,
}

impl CrawlPhase {
    /// Returns true if the coordinator may move from `self` to `next`
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::FetchingSeed)
                | (Self::Idle, Self::FetchingBatch)
                | (Self::FetchingSeed, Self::FetchingBatch)
                | (Self::FetchingSeed, Self::FailedEarly)
                | (Self::FetchingBatch, Self::Completed)
        )
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::FetchingSeed => "fetching seed",
            Self::FetchingBatch => "fetching batch",
            Self::Completed => "completed",
            Self::FailedEarly => "failed early",
        };
        f.write_str(label)
    }
}
