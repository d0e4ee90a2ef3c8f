//! CPU budget for incremental planning.
//!
//! A search episode is a pure compute-bound loop; callers that need bounded
//! latency inject a budget that the loop consults in its continuation
//! condition. The default entry points use an unlimited budget.

use std::time::{Duration, Instant};

/// Budget handed to the search loop. Wraps a caller-supplied predicate that
/// returns true while the planner may keep working.
pub struct CpuBudget {
    should_continue: Box<dyn Fn() -> bool>,
}

impl CpuBudget {
    pub fn new<F: Fn() -> bool + 'static>(should_continue: F) -> Self {
        CpuBudget {
            should_continue: Box::new(should_continue),
        }
    }

    /// Returns true if there is budget remaining to continue work.
    pub fn has_budget(&self) -> bool {
        (self.should_continue)()
    }

    /// Unlimited budget (for offline/one-shot use).
    pub fn unlimited() -> Self {
        CpuBudget {
            should_continue: Box::new(|| true),
        }
    }

    /// Wall-clock deadline starting now.
    pub fn deadline(limit: Duration) -> Self {
        let end = Instant::now() + limit;
        CpuBudget {
            should_continue: Box::new(move || Instant::now() < end),
        }
    }

    /// Deadline in milliseconds, convenient for `PlannerConfig::time_budget_ms`.
    pub fn deadline_ms(ms: u64) -> Self {
        Self::deadline(Duration::from_millis(ms))
    }
}
