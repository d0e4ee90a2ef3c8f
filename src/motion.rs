//! Forward-movement estimation feeding the search heuristic.
//!
//! `max_forward_movement` is a closed-form fit of the displacement the agent
//! covers under full acceleration with inertia decay; the constants are
//! fitted, opaque values carried over from the tuned movement model. The
//! derived remaining-time estimate is *not* admissible: it can overestimate
//! achievable progress (obstacles, gaps and jump arcs are invisible to it).
//! The search loop compensates by re-queueing nodes whose simulated cost
//! comes in worse than their estimate.

use crate::action::Action;
use crate::config::PlannerConfig;

/// Inertia decay applied to horizontal speed each tick.
const SPEED_DECAY: f32 = 0.89;

/// Distance covered at maximum acceleration with `initial_speed` over
/// `ticks` timesteps. Closed form of the iterated accelerate-and-decay
/// recurrence; fitted constants, do not re-derive.
pub fn max_forward_movement(initial_speed: f32, ticks: u32) -> f32 {
    let y = ticks as f32;
    let s0 = initial_speed;
    99.173_553 * SPEED_DECAY.powf(y + 1.0) - 9.090_909 * s0 * SPEED_DECAY.powf(y + 1.0)
        + 10.909_091 * y
        - 88.264_465
        + 9.090_909 * s0
}

/// Estimated ticks to reach the far-off virtual target from position `x`
/// with current speed `speed`, assuming unobstructed maximum progress.
pub fn remaining_time(x: f32, speed: f32, config: &PlannerConfig) -> f32 {
    (config.far_target_distance - (max_forward_movement(speed, 1000) + x)) / config.max_speed
        - config.time_offset
}

/// Estimate the displacement and final speed after holding `action` for
/// `ticks` timesteps, starting at `initial_speed`. Iterates the same
/// accelerate-and-decay model the closed form fits.
pub fn estimate_forward_movement(
    initial_speed: f32,
    action: Action,
    ticks: u32,
    config: &PlannerConfig,
) -> (f32, f32) {
    let direction = action.direction() as f32;
    let mut speed = initial_speed;
    let mut distance = 0.0;
    for _ in 0..ticks {
        speed = (speed + direction * config.acceleration_rate)
            .clamp(-config.max_speed, config.max_speed);
        distance += speed;
        speed *= SPEED_DECAY;
    }
    (distance, speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displacement_grows_with_ticks() {
        let short = max_forward_movement(0.0, 10);
        let long = max_forward_movement(0.0, 100);
        assert!(long > short);
    }

    #[test]
    fn displacement_grows_with_initial_speed() {
        let slow = max_forward_movement(0.0, 50);
        let fast = max_forward_movement(5.0, 50);
        assert!(fast > slow);
    }

    #[test]
    fn remaining_time_shrinks_as_position_advances() {
        let config = PlannerConfig::default();
        let near = remaining_time(0.0, 0.0, &config);
        let far = remaining_time(100.0, 0.0, &config);
        assert!(far < near);
        // Positive over the whole playable range: negative values are the
        // search loop's discard signal and must not occur spuriously.
        assert!(near > 0.0);
    }

    #[test]
    fn estimate_orders_directions() {
        let config = PlannerConfig::default();
        let (right, _) = estimate_forward_movement(0.0, Action::RIGHT, 6, &config);
        let (none, _) = estimate_forward_movement(0.0, Action::NONE, 6, &config);
        let (left, _) = estimate_forward_movement(0.0, Action::LEFT, 6, &config);
        assert!(right > none);
        assert!(none > left);
        assert!(left < 0.0);
    }

    #[test]
    fn estimate_respects_speed_cap() {
        let config = PlannerConfig::default();
        let (distance, speed) = estimate_forward_movement(0.0, Action::RIGHT, 50, &config);
        assert!(speed <= config.max_speed);
        assert!(distance <= config.max_speed * 50.0);
    }

    #[test]
    fn jump_flag_does_not_change_the_estimate() {
        let config = PlannerConfig::default();
        let plain = estimate_forward_movement(1.0, Action::RIGHT, 6, &config);
        let jumping = estimate_forward_movement(1.0, Action::RIGHT | Action::JUMP, 6, &config);
        assert_eq!(plain, jumping);
    }
}
