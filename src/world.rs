//! External world-model contract and the restore discipline around it.
//!
//! The physics simulator is not part of this crate. The planner consumes it
//! through `WorldModel`: one live, in-place-mutated state that can be
//! deep-copied and reinstalled. Simulation during search is destructive, so
//! every exploratory simulate-and-inspect sequence must restore the original
//! live state on every exit path; `RestoreGuard` makes that a scope rule
//! instead of a call-site convention.

use crate::action::Action;
use std::ops::{Deref, DerefMut};

/// Contract for the external physics/world simulator.
///
/// Exactly one live state exists in the planner's view at any time. `tick`
/// mutates it in place by one discrete step; `snapshot`/`restore` deep-copy
/// it out and back in (including any reactivation the simulator needs when a
/// state becomes live again).
pub trait WorldModel {
    /// Deep-copied world state.
    type Snapshot: Clone;

    /// Advance the live state by one tick under the given action.
    fn tick(&mut self, action: Action);

    /// Deep-copy the live state.
    fn snapshot(&self) -> Self::Snapshot;

    /// Install a copy of the given snapshot as the live state.
    fn restore(&mut self, snapshot: &Self::Snapshot);

    /// Agent horizontal position.
    fn x_position(&self) -> f32;

    /// Agent vertical position.
    fn y_position(&self) -> f32;

    /// Current horizontal speed term fed to the forward-movement model.
    fn x_acceleration(&self) -> f32;

    /// Whether the agent may start a jump in the live state.
    fn may_jump(&self) -> bool;

    /// Accumulated damage counter. Monotonic; the planner only ever looks
    /// at deltas across a simulated macro-action.
    fn damage(&self) -> u32;

    /// Whether the column at `x` is a gap in the terrain.
    fn is_gap(&self, x: f32) -> bool;

    /// Depth of the gap at `x` (unspecified when `is_gap(x)` is false).
    fn gap_depth(&self, x: f32) -> f32;
}

/// Scoped snapshot/restore: captures the live state on construction and
/// reinstalls it when dropped, whatever path the scope exits through.
///
/// Derefs to the wrapped world so planning code inside the scope reads and
/// ticks it directly.
pub struct RestoreGuard<'a, W: WorldModel> {
    world: &'a mut W,
    saved: W::Snapshot,
}

impl<'a, W: WorldModel> RestoreGuard<'a, W> {
    pub fn new(world: &'a mut W) -> Self {
        let saved = world.snapshot();
        RestoreGuard { world, saved }
    }
}

impl<W: WorldModel> Drop for RestoreGuard<'_, W> {
    fn drop(&mut self) {
        self.world.restore(&self.saved);
    }
}

impl<W: WorldModel> Deref for RestoreGuard<'_, W> {
    type Target = W;

    fn deref(&self) -> &W {
        self.world
    }
}

impl<W: WorldModel> DerefMut for RestoreGuard<'_, W> {
    fn deref_mut(&mut self) -> &mut W {
        self.world
    }
}
