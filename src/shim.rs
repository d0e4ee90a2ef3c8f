//! Minimal deterministic side-scroller physics for offline use.
//!
//! `ShimWorld` implements `WorldModel` so the planner can be exercised
//! without the real simulator: flat ground at y = 0 with configurable gap
//! spans, horizontal inertia with the same per-tick decay the movement
//! model assumes, no air control, and gap-fall damage. It is a test and
//! benchmarking double, not a faithful game engine; the planner never
//! depends on it.

use crate::action::Action;
use crate::world::WorldModel;

const GROUND_ACCEL: f32 = 0.35;
const SPEED_DECAY: f32 = 0.89;
const MAX_SPEED: f32 = 3.0;
const JUMP_SPEED: f32 = 1.2;
const GRAVITY: f32 = 0.25;
const GAP_DAMAGE: u32 = 5;

/// A gap in the ground: `start <= x < end`, floor at `-depth`.
#[derive(Clone, Copy, Debug)]
pub struct GapSpan {
    pub start: f32,
    pub end: f32,
    pub depth: f32,
}

#[derive(Clone, Debug)]
pub struct ShimWorld {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    damage: u32,
    gaps: Vec<GapSpan>,
}

impl ShimWorld {
    /// Flat ground, no gaps, agent at the origin.
    pub fn flat() -> Self {
        ShimWorld {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            damage: 0,
            gaps: Vec::new(),
        }
    }

    /// Flat ground with a single gap.
    pub fn with_gap(start: f32, width: f32, depth: f32) -> Self {
        Self::with_gaps(vec![GapSpan {
            start,
            end: start + width,
            depth,
        }])
    }

    pub fn with_gaps(gaps: Vec<GapSpan>) -> Self {
        ShimWorld {
            gaps,
            ..Self::flat()
        }
    }

    fn gap_at(&self, x: f32) -> Option<&GapSpan> {
        self.gaps.iter().find(|gap| x >= gap.start && x < gap.end)
    }

    fn floor_at(&self, x: f32) -> f32 {
        self.gap_at(x).map(|gap| -gap.depth).unwrap_or(0.0)
    }

    /// Standing on solid ground at surface level. False while airborne, over
    /// a gap, or at a gap bottom (a fallen agent cannot jump back out).
    fn grounded(&self) -> bool {
        self.y.abs() < 1e-6 && self.gap_at(self.x).is_none()
    }
}

impl WorldModel for ShimWorld {
    type Snapshot = ShimWorld;

    fn tick(&mut self, action: Action) {
        // Horizontal: ground acceleration only, then inertia decay.
        if self.grounded() {
            let direction = action.direction() as f32;
            self.vx = (self.vx + direction * GROUND_ACCEL).clamp(-MAX_SPEED, MAX_SPEED);
        }
        self.vx *= SPEED_DECAY;
        let x_prev = self.x;
        self.x += self.vx;

        // Gap walls are solid below surface level: a fallen agent cannot
        // drift out of a gap sideways.
        if self.y < -0.01 {
            if let Some(gap) = self.gap_at(x_prev).copied() {
                if self.x >= gap.end {
                    self.x = gap.end - 1e-3;
                    self.vx = 0.0;
                } else if self.x < gap.start {
                    self.x = gap.start;
                    self.vx = 0.0;
                }
            }
        }

        // Vertical: jump impulse from the ground, otherwise gravity.
        if action.is_jump() && self.grounded() {
            self.vy = JUMP_SPEED;
        }
        if !self.grounded() || self.vy > 0.0 {
            self.vy -= GRAVITY;
            self.y += self.vy;
        }
        let floor = self.floor_at(self.x);
        if self.y <= floor {
            self.y = floor;
            self.vy = 0.0;
        }

        // Any descent into a gap counts as damage, accruing per tick.
        if self.gap_at(self.x).is_some() && self.y < -0.01 {
            self.damage += GAP_DAMAGE;
        }
    }

    fn snapshot(&self) -> ShimWorld {
        self.clone()
    }

    fn restore(&mut self, snapshot: &ShimWorld) {
        *self = snapshot.clone();
    }

    fn x_position(&self) -> f32 {
        self.x
    }

    fn y_position(&self) -> f32 {
        self.y
    }

    fn x_acceleration(&self) -> f32 {
        self.vx
    }

    fn may_jump(&self) -> bool {
        self.grounded()
    }

    fn damage(&self) -> u32 {
        self.damage
    }

    fn is_gap(&self, x: f32) -> bool {
        self.gap_at(x).is_some()
    }

    fn gap_depth(&self, x: f32) -> f32 {
        self.gap_at(x).map(|gap| gap.depth).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_right_accelerates_up_to_the_cap() {
        let mut world = ShimWorld::flat();
        let mut last_x = world.x_position();
        for _ in 0..50 {
            world.tick(Action::RIGHT);
            assert!(world.x_position() > last_x);
            last_x = world.x_position();
        }
        assert!(world.x_acceleration() <= MAX_SPEED);
        assert!(world.x_acceleration() > 1.0);
        assert_eq!(world.damage(), 0);
    }

    #[test]
    fn jump_arc_rises_and_returns_to_ground() {
        let mut world = ShimWorld::flat();
        assert!(world.may_jump());
        world.tick(Action::JUMP);
        assert!(world.y_position() > 0.0);
        assert!(!world.may_jump());

        let mut peak = world.y_position();
        for _ in 0..30 {
            world.tick(Action::NONE);
            peak = peak.max(world.y_position());
        }
        assert!(peak > 1.0);
        assert_eq!(world.y_position(), 0.0);
        assert!(world.may_jump());
    }

    #[test]
    fn walking_into_a_gap_takes_damage() {
        let mut world = ShimWorld::with_gap(10.0, 3.0, 4.0);
        for _ in 0..40 {
            world.tick(Action::RIGHT);
        }
        assert!(world.damage() > 0);
        assert!(world.y_position() < 0.0);
    }

    #[test]
    fn fallen_agent_stays_in_the_gap() {
        let mut world = ShimWorld::with_gap(10.0, 3.0, 4.0);
        for _ in 0..12 {
            world.tick(Action::RIGHT);
        }
        assert!(world.y_position() < 0.0);

        // Holding right at the gap bottom never climbs back to the surface.
        let damage = world.damage();
        for _ in 0..30 {
            world.tick(Action::RIGHT);
        }
        assert!(world.y_position() < 0.0);
        assert!(world.x_position() < 13.0);
        assert!(world.damage() > damage);
    }

    #[test]
    fn running_jump_clears_a_narrow_gap() {
        let mut world = ShimWorld::with_gap(10.0, 2.0, 4.0);
        for _ in 0..6 {
            world.tick(Action::RIGHT);
        }
        for _ in 0..20 {
            world.tick(Action::RIGHT | Action::JUMP);
        }
        assert_eq!(world.damage(), 0);
        assert!(world.x_position() > 12.0);
    }

    #[test]
    fn restore_installs_a_deep_copy() {
        let mut world = ShimWorld::flat();
        let saved = world.snapshot();
        for _ in 0..10 {
            world.tick(Action::RIGHT);
        }
        assert!(world.x_position() > 0.0);
        world.restore(&saved);
        assert_eq!(world.x_position(), 0.0);
        assert_eq!(world.x_acceleration(), 0.0);
    }

    #[test]
    fn gap_queries_cover_the_span() {
        let world = ShimWorld::with_gap(5.0, 2.0, 3.0);
        assert!(!world.is_gap(4.9));
        assert!(world.is_gap(5.0));
        assert!(world.is_gap(6.9));
        assert!(!world.is_gap(7.0));
        assert_eq!(world.gap_depth(6.0), 3.0);
        assert_eq!(world.gap_depth(4.0), 0.0);
    }
}
