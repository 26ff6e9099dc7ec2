use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tracing::info;

/// Consecutive image misses allowed in one search before image fetching stops.
///
/// Shared by the concurrent resolutions of a single search. A hit resets the run; a
/// limit of `0` means images are never fetched. Once tripped it stays tripped.
#[derive(Debug)]
pub struct MissBudget {
    limit: usize,
    consecutive: AtomicUsize,
    exhausted: AtomicBool,
}

impl MissBudget {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            consecutive: AtomicUsize::new(0),
            exhausted: AtomicBool::new(limit == 0),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted.load(Ordering::Acquire)
    }

    pub fn record_hit(&self) {
        self.consecutive.store(0, Ordering::Release);
    }

    /// Counts a miss; returns `true` if this miss tripped the budget.
    pub fn record_miss(&self) -> bool {
        let misses = self.consecutive.fetch_add(1, Ordering::AcqRel) + 1;
        if misses >= self.limit && !self.exhausted.swap(true, Ordering::AcqRel) {
            info!(misses, "Image miss budget exhausted; remaining candidates scored on name only");
            return true;
        }
        false
    }
}
