//! Public API: one-shot planning and the receding-horizon controller.
//!
//! `plan` runs a full search episode against the current live state and
//! returns the flattened plan. `step` is the per-tick entry point: it
//! executes a committed action prefix while searching from a predicted
//! future snapshot, so planning latency hides behind execution instead of
//! blocking it. Neither leaks mutations into the live world state — every
//! entry point works under a `RestoreGuard`.

use crate::action::Action;
use crate::budget::CpuBudget;
use crate::config::PlannerConfig;
use crate::plan::Plan;
use crate::search::{SearchEpisode, SearchStats};
use crate::world::{RestoreGuard, WorldModel};
use log::*;

pub struct Planner<W: WorldModel> {
    config: PlannerConfig,
    /// Most recent search episode; resumed across `step` calls.
    episode: Option<SearchEpisode<W::Snapshot>>,
    /// Predicted future state the current episode is rooted at.
    work_snapshot: Option<W::Snapshot>,
    /// Committed per-tick actions still to be executed.
    committed: Plan,
    /// Ticks until the next replan.
    ticks_before_replanning: i32,
}

impl<W: WorldModel> Planner<W> {
    pub fn new(config: PlannerConfig) -> Self {
        Planner {
            config,
            episode: None,
            work_snapshot: None,
            committed: Plan::new(),
            ticks_before_replanning: 0,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PlannerConfig {
        &mut self.config
    }

    /// Stats of the most recent search episode, if any has run.
    pub fn last_stats(&self) -> Option<SearchStats> {
        self.episode.as_ref().map(|episode| episode.stats())
    }

    /// Run one full search episode from the current live state and return
    /// the flattened plan. The live state is unchanged on return.
    pub fn plan(&mut self, world: &mut W) -> Plan {
        self.plan_with_budget(world, &CpuBudget::unlimited())
    }

    /// As `plan`, with a caller-supplied compute budget. If the budget runs
    /// out before the progress horizon is reached, the best plan found so
    /// far is returned (or the fallback if nothing was accepted).
    pub fn plan_with_budget(&mut self, world: &mut W, budget: &CpuBudget) -> Plan {
        let mut guard = RestoreGuard::new(world);
        self.restart_episode(&*guard);
        let episode = self.episode.as_mut().expect("episode installed above");
        episode.run(&mut *guard, &self.config, budget);
        episode.extract_plan(&self.config)
    }

    /// Root a fresh episode at the guarded state, reusing the previous
    /// episode's backing storage when one exists.
    fn restart_episode(&mut self, world: &W) {
        match self.episode.as_mut() {
            Some(episode) => episode.restart(world, &self.config),
            None => self.episode = Some(SearchEpisode::start(world, &self.config)),
        }
    }

    /// Produce the next action to execute, replanning as needed. The live
    /// state is unchanged on return.
    pub fn step(&mut self, world: &mut W) -> Action {
        self.step_with_budget(world, &CpuBudget::unlimited())
    }

    /// One tick of the receding-horizon controller: refresh the committed
    /// buffer when the countdown expires, advance the predicted snapshot by
    /// the committed prefix, run a slice of search from it, and emit the
    /// next committed action.
    pub fn step_with_budget(&mut self, world: &mut W, budget: &CpuBudget) -> Action {
        let mut guard = RestoreGuard::new(world);

        self.ticks_before_replanning -= 1;
        if self.ticks_before_replanning <= 0 || self.committed.is_empty() {
            self.committed = match &self.episode {
                Some(episode) => episode.extract_plan(&self.config),
                None => Plan::fallback(&self.config),
            };
            // Clamp the horizon to the plan we actually have.
            let lookahead = self.config.lookahead.min(self.committed.len());
            debug!(
                "replanning: committed {} actions, lookahead {}",
                self.committed.len(),
                lookahead
            );

            // Predict the state `lookahead` ticks out and root the next
            // episode there; the committed prefix covers the gap until that
            // episode's plan is ready.
            for action in self.committed.iter().take(lookahead) {
                guard.tick(*action);
            }
            self.work_snapshot = Some(guard.snapshot());
            self.restart_episode(&*guard);
            self.ticks_before_replanning = lookahead as i32;
        }

        // Amortized search: one slice per external tick against the
        // predicted snapshot, carrying the resulting state forward.
        if let Some(work) = self.work_snapshot.clone() {
            if let Some(episode) = self.episode.as_mut() {
                guard.restore(&work);
                episode.run(&mut *guard, &self.config, budget);
                self.work_snapshot = Some(guard.snapshot());
            }
        }

        self.committed.pop_front().unwrap_or(Action::RIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shim::ShimWorld;

    #[test]
    fn one_shot_plans_are_deterministic() {
        let mut world = ShimWorld::flat();
        let mut planner = Planner::new(PlannerConfig::default());
        let first = planner.plan(&mut world);
        let second = planner.plan(&mut world);
        assert_eq!(first, second);
    }

    #[test]
    fn plan_leaves_the_live_state_untouched() {
        let mut world = ShimWorld::flat();
        let mut planner = Planner::new(PlannerConfig::default());
        let x0 = world.x_position();
        let _ = planner.plan(&mut world);
        assert_eq!(world.x_position(), x0);
        assert_eq!(world.x_acceleration(), 0.0);
        assert_eq!(world.damage(), 0);
    }

    #[test]
    fn flat_terrain_plan_is_pure_forward_motion() {
        let mut world = ShimWorld::flat();
        let mut planner = Planner::new(PlannerConfig::default());
        let plan = planner.plan(&mut world);

        assert!(!plan.is_empty());
        assert!(plan.iter().all(|a| a.is_right() && !a.is_left() && !a.is_jump()));

        // Executing the plan moves strictly right every tick.
        let mut last_x = world.x_position();
        for action in plan.iter() {
            world.tick(*action);
            assert!(world.x_position() > last_x);
            last_x = world.x_position();
        }
        assert_eq!(world.damage(), 0);
    }

    #[test]
    fn step_leaves_the_live_state_untouched() {
        let mut world = ShimWorld::flat();
        let mut planner = Planner::new(PlannerConfig::default());
        let x0 = world.x_position();
        let _ = planner.step(&mut world);
        assert_eq!(world.x_position(), x0);
        assert_eq!(world.x_acceleration(), 0.0);
    }

    #[test]
    fn stepping_drives_the_agent_forward_without_damage() {
        let mut world = ShimWorld::flat();
        let mut planner = Planner::new(PlannerConfig::default());
        for _ in 0..30 {
            let action = planner.step(&mut world);
            world.tick(action);
        }
        assert!(world.x_position() > 5.0);
        assert_eq!(world.damage(), 0);
    }

    #[test]
    fn first_step_replans_and_records_stats() {
        let mut world = ShimWorld::flat();
        let mut planner = Planner::new(PlannerConfig::default());
        assert!(planner.last_stats().is_none());
        let _ = planner.step(&mut world);
        let stats = planner.last_stats().expect("an episode ran");
        assert!(stats.nodes_simulated > 0);
    }

    #[test]
    fn planner_jumps_a_narrow_gap() {
        // Gap from x=10 to x=12; a running jump clears it, running straight
        // through does not.
        let mut world = ShimWorld::with_gap(10.0, 2.0, 4.0);
        let config = PlannerConfig {
            max_right: 16.0,
            ..Default::default()
        };
        let mut planner = Planner::new(config);
        let plan = planner.plan(&mut world);

        assert!(plan.iter().any(|a| a.is_jump()));
        for action in plan.iter() {
            world.tick(*action);
        }
        assert_eq!(world.damage(), 0);
        assert!(world.x_position() > 12.0);
    }

    #[test]
    fn unjumpable_gap_still_yields_a_best_effort_plan() {
        // Far wider than any jump arc at top speed. No node can clear the
        // progress horizon; the planner must still commit to something.
        let mut world = ShimWorld::with_gap(8.0, 30.0, 5.0);
        let config = PlannerConfig {
            max_right: 20.0,
            ..Default::default()
        };
        let mut planner = Planner::new(config);

        // Iteration-capped budget: with an unreachable horizon the loop
        // would otherwise keep exploring.
        let remaining = std::cell::Cell::new(3000u32);
        let budget = CpuBudget::new(move || {
            if remaining.get() == 0 {
                false
            } else {
                remaining.set(remaining.get() - 1);
                true
            }
        });
        let plan = planner.plan_with_budget(&mut world, &budget);

        assert!(!plan.is_empty());
        // The committed prefix is damage-free: it follows accepted nodes.
        for action in plan.iter() {
            world.tick(*action);
        }
        assert_eq!(world.damage(), 0);
    }
}
