//! Approximate closed list for one search episode.
//!
//! Entries are (x, y, elapsed-ticks) points recorded when a node is
//! accepted. Membership is tolerance-based: a query counts as visited when
//! it lies within the configured box around any recorded entry *and* is not
//! earlier in time than that entry. Nodes judged visited are penalized and
//! re-queued, not pruned.

use crate::config::PlannerConfig;

#[derive(Clone, Copy, Debug)]
pub struct VisitedEntry {
    pub x: f32,
    pub y: f32,
    pub ticks: u32,
}

#[derive(Default)]
pub struct VisitedSet {
    entries: Vec<VisitedEntry>,
}

impl VisitedSet {
    pub fn new() -> Self {
        VisitedSet {
            entries: Vec::new(),
        }
    }

    /// Forget everything. Called at the start of every episode.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record an accepted node's position and time.
    pub fn record(&mut self, x: f32, y: f32, ticks: u32) {
        self.entries.push(VisitedEntry { x, y, ticks });
    }

    /// Whether (x, y, ticks) lies within tolerance of a recorded entry
    /// whose time is not later than `ticks`. The time asymmetry matters:
    /// only a node at or after a recorded point can be a revisit of it.
    pub fn contains(&self, x: f32, y: f32, ticks: u32, config: &PlannerConfig) -> bool {
        let t = ticks as f32;
        self.entries.iter().any(|entry| {
            (entry.x - x).abs() < config.x_tolerance
                && (entry.y - y).abs() < config.y_tolerance
                && (entry.ticks as f32 - t).abs() < config.time_tolerance
                && ticks >= entry.ticks
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PlannerConfig {
        PlannerConfig {
            x_tolerance: 1.0,
            y_tolerance: 1.0,
            time_tolerance: 3.0,
            ..Default::default()
        }
    }

    #[test]
    fn exact_point_is_visited() {
        let config = config();
        let mut set = VisitedSet::new();
        set.record(5.0, 2.0, 12);
        assert!(set.contains(5.0, 2.0, 12, &config));
    }

    #[test]
    fn nearby_point_within_tolerances_is_visited() {
        let config = config();
        let mut set = VisitedSet::new();
        set.record(5.0, 2.0, 12);
        assert!(set.contains(5.5, 1.5, 14, &config));
    }

    #[test]
    fn out_of_tolerance_on_any_axis_is_not_visited() {
        let config = config();
        let mut set = VisitedSet::new();
        set.record(5.0, 2.0, 12);
        assert!(!set.contains(7.0, 2.0, 12, &config));
        assert!(!set.contains(5.0, 4.0, 12, &config));
        assert!(!set.contains(5.0, 2.0, 16, &config));
    }

    #[test]
    fn earlier_in_time_is_never_a_revisit() {
        let config = config();
        let mut set = VisitedSet::new();
        set.record(5.0, 2.0, 12);
        // Within the time tolerance but strictly before the entry.
        assert!(!set.contains(5.0, 2.0, 11, &config));
    }

    #[test]
    fn clear_forgets_entries() {
        let config = config();
        let mut set = VisitedSet::new();
        set.record(5.0, 2.0, 12);
        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(5.0, 2.0, 12, &config));
    }
}
