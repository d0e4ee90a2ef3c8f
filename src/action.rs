use bitflags::*;
use serde::{Deserialize, Serialize};

bitflags! {
    /// One control input frame: three independent buttons.
    ///
    /// LEFT and RIGHT are not mutually exclusive in the representation;
    /// the candidate enumerator never emits both at once.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Action: u8 {
        const NONE = 0;
        const LEFT = 1;
        const RIGHT = 2;
        const JUMP = 4;
    }
}

impl Action {
    /// Build an action from explicit button states.
    pub fn new(left: bool, right: bool, jump: bool) -> Action {
        let mut action = Action::NONE;
        if left {
            action |= Action::LEFT;
        }
        if right {
            action |= Action::RIGHT;
        }
        if jump {
            action |= Action::JUMP;
        }
        action
    }

    pub fn is_left(&self) -> bool {
        self.contains(Action::LEFT)
    }

    pub fn is_right(&self) -> bool {
        self.contains(Action::RIGHT)
    }

    pub fn is_jump(&self) -> bool {
        self.contains(Action::JUMP)
    }

    /// Horizontal direction encoded by this action: -1, 0 or +1.
    pub fn direction(&self) -> i32 {
        if self.is_left() {
            -1
        } else if self.is_right() {
            1
        } else {
            0
        }
    }
}

impl Default for Action {
    fn default() -> Self {
        Action::NONE
    }
}

impl Serialize for Action {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        u8::deserialize(deserializer).map(Action::from_bits_truncate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sets_expected_flags() {
        let action = Action::new(false, true, true);
        assert!(!action.is_left());
        assert!(action.is_right());
        assert!(action.is_jump());
    }

    #[test]
    fn direction_prefers_left_then_right() {
        assert_eq!(Action::new(true, false, false).direction(), -1);
        assert_eq!(Action::new(false, true, true).direction(), 1);
        assert_eq!(Action::new(false, false, true).direction(), 0);
    }

    #[test]
    fn serde_round_trips_as_raw_bits() {
        let action = Action::new(true, false, true);
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, action.bits().to_string());
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(back, action);
    }
}
