//! One search episode: weighted best-first search over macro-actions.
//!
//! The episode owns the node arena, the open frontier and the visited set.
//! Nodes are selected by a linear minimum-cost scan, simulated lazily, and
//! dispatched: discarded (anomalous), penalized and re-queued (near a
//! visited point), re-queued with a corrected estimate (simulation came in
//! worse than the heuristic), or accepted and expanded. The episode can be
//! resumed: `run` picks up where the previous call left off, which is how
//! the receding-horizon controller amortizes search across external ticks.

use crate::budget::CpuBudget;
use crate::config::PlannerConfig;
use crate::motion;
use crate::node::{NodeArena, NodeId};
use crate::plan::Plan;
use crate::visited::VisitedSet;
use crate::world::WorldModel;
use itertools::Itertools;
use log::*;
use std::cmp::Ordering;

/// Slack before a simulated node is considered worse than its estimate and
/// sent back to the frontier for re-competition.
const REQUEUE_EPSILON: f32 = 0.1;

/// Cost contribution of a damage delta measured at `elapsed_ticks` into the
/// plan. The penalty decays with elapsed time: unavoidable damage is worth
/// deferring, since a later hit leaves more room to replan around it.
fn damage_cost(damage_delta: u32, elapsed_ticks: u32, config: &PlannerConfig) -> f32 {
    damage_delta as f32
        * (config.damage_penalty - config.damage_penalty_time_factor * elapsed_ticks as f32)
}

/// Counters describing the work done by an episode so far.
#[derive(Clone, Debug, Default)]
pub struct SearchStats {
    pub nodes_simulated: u64,
    pub nodes_accepted: u64,
    pub nodes_requeued_visited: u64,
    pub nodes_requeued_optimistic: u64,
    pub nodes_discarded: u64,
    pub frontier_size: usize,
}

/// A single search episode rooted at one world snapshot.
pub struct SearchEpisode<S> {
    arena: NodeArena<S>,
    frontier: Vec<NodeId>,
    visited: VisitedSet,
    /// Accepted node with the greatest horizontal position.
    best: NodeId,
    /// Accepted node with the greatest horizontal position that is not over
    /// a gap. Lags `best` by construction; see the gap-recovery fallback.
    furthest: NodeId,
    start_x: f32,
    stats: SearchStats,
}

impl<S: Clone> SearchEpisode<S> {
    /// Start an episode rooted at the current live world state. The root is
    /// expanded immediately so the frontier starts with its children.
    pub fn start<W>(world: &W, config: &PlannerConfig) -> Self
    where
        W: WorldModel<Snapshot = S>,
    {
        let mut arena = NodeArena::new();
        let root = arena.new_root(world, config);
        let mut episode = SearchEpisode {
            arena,
            frontier: Vec::new(),
            visited: VisitedSet::new(),
            best: root,
            furthest: root,
            start_x: world.x_position(),
            stats: SearchStats::default(),
        };
        episode.expand(root, world, config);
        episode
    }

    /// Re-root the episode at a new live state, reusing the arena, frontier
    /// and visited-set backing storage from the previous episode.
    pub fn restart<W>(&mut self, world: &W, config: &PlannerConfig)
    where
        W: WorldModel<Snapshot = S>,
    {
        self.arena.clear();
        self.frontier.clear();
        self.visited.clear();
        let root = self.arena.new_root(world, config);
        self.best = root;
        self.furthest = root;
        self.start_x = world.x_position();
        self.stats = SearchStats::default();
        self.expand(root, world, config);
    }

    /// Horizontal progress of the best accepted node since episode start.
    pub fn progress(&self) -> f32 {
        self.arena.get(self.best).x - self.start_x
    }

    /// Horizontal position of the currently chosen terminal node.
    pub fn best_x(&self) -> f32 {
        self.arena.get(self.best).x
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn stats(&self) -> SearchStats {
        SearchStats {
            frontier_size: self.frontier.len(),
            ..self.stats.clone()
        }
    }

    /// Run the search loop until it has planned `max_right` ahead of the
    /// episode start (with the last accepted node good), the frontier is
    /// exhausted, or the budget runs out.
    ///
    /// Leaves the live world state equal to the chosen terminal node's
    /// snapshot; the caller owns restoring the real state afterwards.
    pub fn run<W>(&mut self, world: &mut W, config: &PlannerConfig, budget: &CpuBudget)
    where
        W: WorldModel<Snapshot = S>,
    {
        let mut current_good = false;

        while !self.frontier.is_empty()
            && (self.progress() < config.max_right || !current_good)
            && budget.has_budget()
        {
            let current = self.pick_best(config);
            current_good = false;

            let real_remaining = self.simulate(current, world, config);
            let (x, y, elapsed_ticks, was_flagged, estimate) = {
                let node = self.arena.get(current);
                (
                    node.x,
                    node.y,
                    node.elapsed_ticks,
                    node.in_visited_list,
                    node.estimated_remaining,
                )
            };

            if real_remaining < 0.0 {
                // Logic anomaly; drop the node and move on.
                self.stats.nodes_discarded += 1;
                trace!(
                    "discarded node {:?} with negative remaining time {}",
                    current.index(),
                    real_remaining
                );
            } else if !was_flagged && self.visited.contains(x, y, elapsed_ticks, config) {
                // Too close to an already-accepted (position, time) point.
                // Soft penalty and re-competition, not a hard rejection.
                let penalized = real_remaining + config.visited_penalty;
                let node = self.arena.get_mut(current);
                node.real_remaining = Some(penalized);
                node.estimated_remaining = penalized;
                node.in_visited_list = true;
                self.frontier.push(current);
                self.stats.nodes_requeued_visited += 1;
                trace!("requeued node {:?} as visited", current.index());
            } else if real_remaining - estimate > REQUEUE_EPSILON {
                // The estimate was optimistic. Correct it and let the node
                // re-compete instead of eagerly simulating the whole frontier.
                self.arena.get_mut(current).estimated_remaining = real_remaining;
                self.frontier.push(current);
                self.stats.nodes_requeued_optimistic += 1;
            } else {
                // Estimate confirmed: accept and expand.
                current_good = true;
                self.stats.nodes_accepted += 1;
                self.visited.record(x, y, elapsed_ticks);
                self.expand(current, world, config);

                if x > self.arena.get(self.best).x {
                    self.best = current;
                }
                // Track the furthest safe node separately: if the search is
                // cut off while best hangs over a gap, this is the recovery
                // target.
                if x > self.arena.get(self.furthest).x && !world.is_gap(x) {
                    self.furthest = current;
                }
            }
        }

        // Recovery: don't commit to a node over a gap when a clearly
        // further safe node exists and the horizon wasn't reached.
        let best_x = self.arena.get(self.best).x;
        let furthest_x = self.arena.get(self.furthest).x;
        if self.progress() < config.max_right
            && furthest_x > best_x + config.furthest_margin
            && world.is_gap(best_x)
        {
            debug!(
                "gap recovery: replacing best at x={} with furthest at x={}",
                best_x, furthest_x
            );
            self.best = self.furthest;
        }

        if let Some(snapshot) = self.arena.get(self.best).snapshot.as_ref() {
            world.restore(snapshot);
        }

        debug!(
            "search paused/complete: simulated={}, accepted={}, requeued_visited={}, requeued_optimistic={}, discarded={}, frontier={}, progress={:.2}",
            self.stats.nodes_simulated,
            self.stats.nodes_accepted,
            self.stats.nodes_requeued_visited,
            self.stats.nodes_requeued_optimistic,
            self.stats.nodes_discarded,
            self.frontier.len(),
            self.progress()
        );
    }

    /// Flatten the chosen terminal node's ancestry into a per-tick plan.
    /// A degenerate search (nothing beyond the root) yields the fixed
    /// steady-forward fallback.
    pub fn extract_plan(&self, config: &PlannerConfig) -> Plan {
        let mut path = Vec::new();
        let mut cursor = self.best;
        while let Some(parent) = self.arena.get(cursor).parent {
            path.push(cursor);
            cursor = parent;
        }

        if path.is_empty() {
            debug!("no terminal node beyond the root, emitting fallback plan");
            return Plan::fallback(config);
        }

        let mut plan = Plan::new();
        for id in path.iter().rev() {
            let node = self.arena.get(*id);
            for _ in 0..node.repetitions {
                plan.push(node.action);
            }
        }
        plan
    }

    /// Remove and return the minimum-cost frontier node (linear scan).
    fn pick_best(&mut self, config: &PlannerConfig) -> NodeId {
        let arena = &self.arena;
        let index = self
            .frontier
            .iter()
            .position_min_by(|a, b| {
                arena
                    .get(**a)
                    .frontier_cost(config)
                    .partial_cmp(&arena.get(**b).frontier_cost(config))
                    .unwrap_or(Ordering::Equal)
            })
            .expect("pick_best requires a non-empty frontier");
        self.frontier.swap_remove(index)
    }

    /// Apply the node's macro-action against the parent's snapshot and
    /// measure the outcome. Leaves the live world state at this node's
    /// resulting state (which `expand` relies on for child estimates).
    fn simulate<W>(&mut self, id: NodeId, world: &mut W, config: &PlannerConfig) -> f32
    where
        W: WorldModel<Snapshot = S>,
    {
        let parent = self
            .arena
            .get(id)
            .parent
            .expect("the episode root is never queued for simulation");
        {
            let parent_snapshot = self
                .arena
                .get(parent)
                .snapshot
                .as_ref()
                .expect("parents are simulated before their children");
            world.restore(parent_snapshot);
        }

        let (action, repetitions, elapsed_ticks, in_visited_list) = {
            let node = self.arena.get(id);
            (
                node.action,
                node.repetitions,
                node.elapsed_ticks,
                node.in_visited_list,
            )
        };

        let initial_damage = world.damage();
        for _ in 0..repetitions {
            world.tick(action);
        }
        let damage_delta = world.damage().saturating_sub(initial_damage);

        let mut real_remaining =
            motion::remaining_time(world.x_position(), world.x_acceleration(), config)
                + damage_cost(damage_delta, elapsed_ticks, config);
        if in_visited_list {
            real_remaining += config.visited_penalty;
        }

        let node = self.arena.get_mut(id);
        node.real_remaining = Some(real_remaining);
        node.has_been_hurt = damage_delta != 0;
        node.snapshot = Some(world.snapshot());
        node.x = world.x_position();
        node.y = world.y_position();
        node.may_jump = world.may_jump();
        self.stats.nodes_simulated += 1;

        real_remaining
    }

    /// Push all candidate children of a simulated node into the frontier.
    /// Precondition: the live world state equals the node's resulting state.
    fn expand<W>(&mut self, id: NodeId, world: &W, config: &PlannerConfig)
    where
        W: WorldModel<Snapshot = S>,
    {
        for action in self.arena.possible_actions(id) {
            let child = self.arena.new_child(id, action, world, config);
            self.frontier.push(child);
        }
    }
}
