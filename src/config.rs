//! Planner configuration.
//!
//! Every tunable of the search and the receding-horizon controller lives in
//! one `PlannerConfig` value constructed by the caller and threaded through
//! the planner, the search loop and the node operations. The defaults are
//! the constants the planner was tuned with; they interact (the damage
//! penalty must dwarf any reachable remaining-time value for the penalty to
//! dominate node ordering), so change them together, not in isolation.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// How many ticks each macro-action is held. Constant for the lifetime
    /// of a search episode.
    pub repetitions: u32,
    /// How many ticks of the committed plan are executed before replanning
    /// (the rolling-horizon prefix length).
    pub lookahead: usize,
    /// Visited-set tolerance on horizontal position.
    pub x_tolerance: f32,
    /// Visited-set tolerance on vertical position.
    pub y_tolerance: f32,
    /// Visited-set tolerance on elapsed ticks.
    pub time_tolerance: f32,
    /// Base cost added per point of damage taken during simulation.
    pub damage_penalty: f32,
    /// Per-tick decay of the damage penalty: damage taken later in the plan
    /// costs less, deliberately favouring plans that defer unavoidable hits.
    pub damage_penalty_time_factor: f32,
    /// Cost added to nodes that land too close to an already-accepted
    /// (position, time) point. A soft penalty: the node re-competes in the
    /// frontier instead of being pruned.
    pub visited_penalty: f32,
    /// Distant virtual target the remaining-time heuristic measures against.
    pub far_target_distance: f32,
    /// Top running speed assumed by the remaining-time heuristic.
    pub max_speed: f32,
    /// Per-tick speed gain assumed by the forward-movement estimate when a
    /// horizontal direction is held.
    pub acceleration_rate: f32,
    /// Constant subtracted from the remaining-time estimate (offsets the
    /// projection horizon baked into the forward-movement model).
    pub time_offset: f32,
    /// Horizontal progress (from the episode start position) at which an
    /// episode counts as having planned far enough ahead.
    pub max_right: f32,
    /// How far beyond the best node the furthest node must be before the
    /// gap-recovery fallback replaces best with furthest.
    pub furthest_margin: f32,
    /// Length of the emergency all-right plan emitted when a search episode
    /// produces no usable terminal node.
    pub fallback_plan_len: usize,
    /// Weight applied to elapsed ticks in the frontier ordering. Below 1.0
    /// this is a weighted A* that trusts the heuristic more than the
    /// accumulated cost.
    pub elapsed_weight: f32,
    /// Advisory per-episode time budget in milliseconds. Not enforced by
    /// default; feed it to `CpuBudget::deadline` and use the `*_with_budget`
    /// planner entry points to enforce it.
    pub time_budget_ms: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            repetitions: 6,
            lookahead: 2,
            x_tolerance: 0.1,
            y_tolerance: 0.1,
            time_tolerance: 0.1,
            damage_penalty: 1_000_000.0,
            damage_penalty_time_factor: 100.0,
            visited_penalty: 1500.0,
            far_target_distance: 100_000.0,
            max_speed: 10.0,
            acceleration_rate: 2.0,
            time_offset: 1000.0,
            max_right: 4.0,
            furthest_margin: 20.0,
            fallback_plan_len: 10,
            elapsed_weight: 0.90,
            time_budget_ms: 20,
        }
    }
}
