//! Committed action plans.
//!
//! A plan is an ordered FIFO of per-tick actions in chronological order.
//! Extraction from a finished search walks the chosen node back to the
//! episode root and expands each macro-action into `repetitions` identical
//! per-tick actions (see `SearchEpisode::extract_plan`). A plan is never
//! empty from the planner's point of view: degenerate searches produce the
//! fixed fallback below.

use crate::action::Action;
use crate::config::PlannerConfig;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Plan {
    actions: VecDeque<Action>,
}

impl Plan {
    pub fn new() -> Self {
        Plan {
            actions: VecDeque::new(),
        }
    }

    /// Steady-forward emergency plan, emitted when a search episode yields
    /// no usable terminal node. Always non-empty.
    pub fn fallback(config: &PlannerConfig) -> Self {
        let mut plan = Plan::new();
        for _ in 0..config.fallback_plan_len.max(1) {
            plan.push(Action::RIGHT);
        }
        plan
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Append an action at the end (later in time).
    pub fn push(&mut self, action: Action) {
        self.actions.push_back(action);
    }

    /// Remove and return the next action to execute.
    pub fn pop_front(&mut self) -> Option<Action> {
        self.actions.pop_front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }
}

impl FromIterator<Action> for Plan {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Plan {
            actions: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_all_forward_and_non_empty() {
        let config = PlannerConfig::default();
        let plan = Plan::fallback(&config);
        assert_eq!(plan.len(), config.fallback_plan_len);
        assert!(plan.iter().all(|a| a.is_right() && !a.is_jump()));
    }

    #[test]
    fn fallback_never_empty_even_with_zero_config() {
        let config = PlannerConfig {
            fallback_plan_len: 0,
            ..Default::default()
        };
        assert!(!Plan::fallback(&config).is_empty());
    }

    #[test]
    fn pop_front_preserves_order() {
        let mut plan: Plan = [Action::LEFT, Action::RIGHT, Action::JUMP]
            .into_iter()
            .collect();
        assert_eq!(plan.pop_front(), Some(Action::LEFT));
        assert_eq!(plan.pop_front(), Some(Action::RIGHT));
        assert_eq!(plan.pop_front(), Some(Action::JUMP));
        assert_eq!(plan.pop_front(), None);
    }
}
