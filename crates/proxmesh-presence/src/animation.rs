//! Avatar animation state.
//!
//! On the wire an animation is a tag such as `walk_left` or `idle_front`.
//! Locally it is a (motion, facing) pair, so the idle variant of whatever
//! the avatar was last doing is derived from the facing direction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    Left,
    Right,
    #[default]
    Front,
    Back,
}

impl Facing {
    fn as_str(&self) -> &'static str {
        match self {
            Facing::Left => "left",
            Facing::Right => "right",
            Facing::Front => "front",
            Facing::Back => "back",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Motion {
    #[default]
    Idle,
    Walk,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown animation tag: {0:?}")]
pub struct ParseAnimationError(pub String);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AnimationState {
    pub motion: Motion,
    pub facing: Facing,
}

impl AnimationState {
    pub fn idle(facing: Facing) -> Self {
        Self {
            motion: Motion::Idle,
            facing,
        }
    }

    pub fn walk(facing: Facing) -> Self {
        Self {
            motion: Motion::Walk,
            facing,
        }
    }

    /// The resting animation for the current facing.
    pub fn to_idle(self) -> Self {
        Self::idle(self.facing)
    }

    pub fn is_walking(&self) -> bool {
        self.motion == Motion::Walk
    }
}

impl fmt::Display for AnimationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let motion = match self.motion {
            Motion::Idle => "idle",
            Motion::Walk => "walk",
        };
        write!(f, "{motion}_{}", self.facing.as_str())
    }
}

impl FromStr for AnimationState {
    type Err = ParseAnimationError;

    /// Accepts `<motion>_<facing>` with an optional trailing frame number
    /// (`idle_front_1`), which some clients send instead of the clip name.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let err = || ParseAnimationError(tag.to_string());
        let mut parts = tag.split('_');

        let motion = match parts.next() {
            Some("idle") => Motion::Idle,
            Some("walk") => Motion::Walk,
            _ => return Err(err()),
        };
        let facing = match parts.next() {
            Some("left") => Facing::Left,
            Some("right") => Facing::Right,
            Some("front") => Facing::Front,
            Some("back") => Facing::Back,
            _ => return Err(err()),
        };
        match (parts.next(), parts.next()) {
            (None, _) => {}
            (Some(frame), None) if !frame.is_empty() && frame.bytes().all(|b| b.is_ascii_digit()) => {}
            _ => return Err(err()),
        }

        Ok(Self { motion, facing })
    }
}

impl TryFrom<String> for AnimationState {
    type Error = ParseAnimationError;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        tag.parse()
    }
}

impl From<AnimationState> for String {
    fn from(state: AnimationState) -> Self {
        state.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_idle_front() {
        assert_eq!(AnimationState::default().to_string(), "idle_front");
    }

    #[test]
    fn parses_every_clip_name() {
        for motion in ["idle", "walk"] {
            for facing in ["left", "right", "front", "back"] {
                let tag = format!("{motion}_{facing}");
                let state: AnimationState = tag.parse().unwrap();
                assert_eq!(state.to_string(), tag);
            }
        }
    }

    #[test]
    fn parses_frame_suffix() {
        let state: AnimationState = "idle_front_1".parse().unwrap();
        assert_eq!(state, AnimationState::idle(Facing::Front));
    }

    #[test]
    fn rejects_unknown_tags() {
        assert!("run_left".parse::<AnimationState>().is_err());
        assert!("walk_up".parse::<AnimationState>().is_err());
        assert!("walk".parse::<AnimationState>().is_err());
        assert!("walk_left_x".parse::<AnimationState>().is_err());
        assert!("walk_left_1_2".parse::<AnimationState>().is_err());
        assert!("".parse::<AnimationState>().is_err());
    }

    #[test]
    fn idle_keeps_last_facing() {
        let walking = AnimationState::walk(Facing::Back);
        assert!(walking.is_walking());
        assert_eq!(walking.to_idle(), AnimationState::idle(Facing::Back));
        assert_eq!(walking.to_idle().to_string(), "idle_back");
    }

    #[test]
    fn serializes_as_tag() {
        let json = serde_json::to_string(&AnimationState::walk(Facing::Left)).unwrap();
        assert_eq!(json, "\"walk_left\"");
        let back: AnimationState = serde_json::from_str("\"idle_right\"").unwrap();
        assert_eq!(back, AnimationState::idle(Facing::Right));
        assert!(serde_json::from_str::<AnimationState>("\"dance\"").is_err());
    }
}
