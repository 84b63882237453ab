//! Guarded fetch controller
//!
//! Decides whether the current pagination model warrants a new fetch.

use super::types::{PageRequest, PaginationModel, ResultPage};
use crate::types::FetchStatus;
use tracing::debug;

/// Why the controller declined to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A fetch is already in flight
    InFlight,
    /// The last fetch finished and reported no further pages
    Exhausted,
}

/// Outcome of a guard evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDecision {
    /// Issue a fetch with these parameters
    Fetch(PageRequest),
    /// Do nothing
    Skip(SkipReason),
}

impl FetchDecision {
    /// The request to issue, if any
    pub fn request(&self) -> Option<PageRequest> {
        match self {
            Self::Fetch(req) => Some(*req),
            Self::Skip(_) => None,
        }
    }

    /// Check if this decision issues a fetch
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}

/// Stateless guard over (model, prior result, status)
///
/// The guard only blocks while a fetch is in flight, or when the last fetch
/// finished with `has_next_page == false`. The prior result is not tied to
/// the model that produced it, so a finished, exhausted result keeps
/// blocking even after the page changes. `Idle` and `Error` always admit
/// a fetch.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchController;

impl FetchController {
    /// Create a controller
    pub fn new() -> Self {
        Self
    }

    /// Evaluate the guard
    pub fn evaluate<T>(
        &self,
        model: &PaginationModel,
        prior: &ResultPage<T>,
        status: FetchStatus,
    ) -> FetchDecision {
        let decision = decide(model, prior.has_next_page, status);
        debug!(
            page = model.page,
            page_size = model.page_size,
            has_next_page = prior.has_next_page,
            %status,
            ?decision,
            "Evaluated fetch guard"
        );
        decision
    }
}

/// The guard itself, without logging
pub fn decide(model: &PaginationModel, has_next_page: bool, status: FetchStatus) -> FetchDecision {
    if status == FetchStatus::Loading {
        return FetchDecision::Skip(SkipReason::InFlight);
    }
    if !has_next_page && status == FetchStatus::Finished {
        return FetchDecision::Skip(SkipReason::Exhausted);
    }
    FetchDecision::Fetch(model.request())
}
