//! Local avatar movement.

use std::time::Duration;

use proxmesh_common::Position;

use crate::animation::{AnimationState, Facing};
use crate::state::LocalState;

/// Directional keys currently held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl DirectionInput {
    /// The single direction that wins when several keys are held:
    /// left, then right, then up, then down.
    pub fn resolve(&self) -> Option<Facing> {
        if self.left {
            Some(Facing::Left)
        } else if self.right {
            Some(Facing::Right)
        } else if self.up {
            Some(Facing::Back)
        } else if self.down {
            Some(Facing::Front)
        } else {
            None
        }
    }
}

/// The locally controlled avatar. Screen coordinates: `y` grows downward.
#[derive(Debug, Clone)]
pub struct LocalAvatar {
    position: Position,
    animation: AnimationState,
    speed: f64,
}

impl LocalAvatar {
    pub fn new(spawn: Position, speed: f64) -> Self {
        Self {
            position: spawn,
            animation: AnimationState::default(),
            speed,
        }
    }

    pub fn state(&self) -> LocalState {
        LocalState {
            position: self.position,
            animation: self.animation,
        }
    }

    /// Advance by `dt` under `input`.
    pub fn step(&mut self, input: DirectionInput, dt: Duration) -> LocalState {
        match input.resolve() {
            Some(facing) => {
                let distance = self.speed * dt.as_secs_f64();
                match facing {
                    Facing::Left => self.position.x -= distance,
                    Facing::Right => self.position.x += distance,
                    Facing::Back => self.position.y -= distance,
                    Facing::Front => self.position.y += distance,
                }
                self.animation = AnimationState::walk(facing);
            }
            None => self.animation = self.animation.to_idle(),
        }
        self.state()
    }
}
