//! Search nodes and the episode-scoped node arena.
//!
//! One node is one macro-action application: an action held for a fixed
//! number of ticks. Nodes are created cheap (heuristic only) and simulated
//! lazily when the search loop selects them. Parent links are arena indices;
//! the whole arena is cleared when a new episode starts, so there is no
//! per-node allocation churn and no ownership cycles.

use crate::action::Action;
use crate::config::PlannerConfig;
use crate::motion;
use crate::world::WorldModel;

/// Index of a node in its episode's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One macro-action application in the search tree.
///
/// `x`, `y` and `may_jump` cache the observations made when the node was
/// simulated; they are meaningful only while `snapshot` is `Some`.
pub struct SearchNode<S> {
    /// The action held for `repetitions` ticks to reach this node.
    pub action: Action,
    /// Macro-action length. Constant across one search episode.
    pub repetitions: u32,
    /// Ticks since the episode root. Child = parent + repetitions.
    pub elapsed_ticks: u32,
    /// Heuristic remaining-time estimate, computed at construction.
    pub estimated_remaining: f32,
    /// Remaining time measured by simulation. `None` until simulated;
    /// cost reads fall back to the estimate.
    pub real_remaining: Option<f32>,
    /// Whether simulating this node increased the damage counter.
    pub has_been_hurt: bool,
    /// Sticky visited flag: set at most once per episode, never cleared.
    pub in_visited_list: bool,
    /// Arena index of the parent; `None` for the episode root.
    pub parent: Option<NodeId>,
    /// World state after this node's macro-action, captured by simulation.
    pub snapshot: Option<S>,
    /// Horizontal position after simulation.
    pub x: f32,
    /// Vertical position after simulation.
    pub y: f32,
    /// Jump eligibility after simulation.
    pub may_jump: bool,
}

impl<S> SearchNode<S> {
    /// Measured remaining time if this node has been simulated, otherwise
    /// the heuristic estimate. An unsimulated read is never ground truth.
    pub fn remaining_time(&self) -> f32 {
        self.real_remaining.unwrap_or(self.estimated_remaining)
    }

    /// Frontier ordering key: remaining time plus down-weighted elapsed
    /// ticks. Weighted A*, biased towards nodes further along their plan.
    pub fn frontier_cost(&self, config: &PlannerConfig) -> f32 {
        self.remaining_time() + self.elapsed_ticks as f32 * config.elapsed_weight
    }

    pub fn is_simulated(&self) -> bool {
        self.snapshot.is_some()
    }
}

/// Growable, episode-scoped node storage addressed by `NodeId`.
pub struct NodeArena<S> {
    nodes: Vec<SearchNode<S>>,
}

impl<S> NodeArena<S> {
    pub fn new() -> Self {
        NodeArena { nodes: Vec::new() }
    }

    /// Drop all nodes. Called at the start of every episode.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> &SearchNode<S> {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode<S> {
        &mut self.nodes[id.0]
    }

    pub fn push(&mut self, node: SearchNode<S>) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Create the episode root from the live world state. The root counts
    /// as already simulated: its snapshot and observations are the live
    /// state itself.
    pub fn new_root<W>(&mut self, world: &W, config: &PlannerConfig) -> NodeId
    where
        W: WorldModel<Snapshot = S>,
    {
        let estimate = motion::remaining_time(world.x_position(), 0.0, config);
        self.push(SearchNode {
            action: Action::NONE,
            repetitions: config.repetitions,
            elapsed_ticks: 0,
            estimated_remaining: estimate,
            real_remaining: None,
            has_been_hurt: false,
            in_visited_list: false,
            parent: None,
            snapshot: Some(world.snapshot()),
            x: world.x_position(),
            y: world.y_position(),
            may_jump: world.may_jump(),
        })
    }

    /// Create an unsimulated child of `parent`.
    ///
    /// Precondition: the live world state equals the parent's resulting
    /// state (children are created right after their parent is accepted),
    /// so the heuristic projects from the live position and speed.
    pub fn new_child<W>(
        &mut self,
        parent: NodeId,
        action: Action,
        world: &W,
        config: &PlannerConfig,
    ) -> NodeId
    where
        W: WorldModel<Snapshot = S>,
    {
        let repetitions = self.get(parent).repetitions;
        let elapsed_ticks = self.get(parent).elapsed_ticks + repetitions;
        let (distance, speed) =
            motion::estimate_forward_movement(world.x_acceleration(), action, repetitions, config);
        let estimate = motion::remaining_time(world.x_position() + distance, speed, config);
        self.push(SearchNode {
            action,
            repetitions,
            elapsed_ticks,
            estimated_remaining: estimate,
            real_remaining: None,
            has_been_hurt: false,
            in_visited_list: false,
            parent: Some(parent),
            snapshot: None,
            x: 0.0,
            y: 0.0,
            may_jump: false,
        })
    }

    /// Jump-eligibility predicate for candidate enumeration.
    ///
    /// Eligible if the node's own simulated state is, or (one level of
    /// tolerance) if its parent's was. Macro-action granularity obscures the
    /// exact landing tick; propagating eligibility by one extra generation
    /// keeps jump candidates available across that boundary.
    pub fn can_jump_higher(&self, id: NodeId, check_parent: bool) -> bool {
        if check_parent {
            if let Some(parent) = self.get(id).parent {
                if self.can_jump_higher(parent, false) {
                    return true;
                }
            }
        }
        self.get(id).may_jump
    }

    /// Enumerate candidate child macro-actions for a simulated node.
    /// Plain left/right are always offered; jump variants only when the
    /// eligibility predicate holds.
    pub fn possible_actions(&self, id: NodeId) -> Vec<Action> {
        let can_jump = self.can_jump_higher(id, true);
        let mut actions = Vec::with_capacity(5);
        if can_jump {
            actions.push(Action::JUMP);
        }
        actions.push(Action::RIGHT);
        if can_jump {
            actions.push(Action::RIGHT | Action::JUMP);
        }
        actions.push(Action::LEFT);
        if can_jump {
            actions.push(Action::LEFT | Action::JUMP);
        }
        actions
    }
}

impl<S> Default for NodeArena<S> {
    fn default() -> Self {
        Self::new()
    }
}
