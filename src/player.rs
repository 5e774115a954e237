use std::f32::consts::PI;

use crate::config::{MOVE_SPEED, PLAYER_RADIUS, TURN_SPEED};
use crate::geometry::{Segment, Vec2};

/// Held direction keys, sampled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub forward: bool,
    pub backward: bool,
    pub turn_right: bool,
    pub turn_left: bool,
}

/// What a tick of `Player::update` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Walked,
    /// Tried to walk but the probe hit a wall
    Blocked,
    Turned,
    Idle,
}

impl Motion {
    /// Footsteps play while a move key is honoured, even against a wall.
    pub fn is_walking(self) -> bool {
        matches!(self, Motion::Walked | Motion::Blocked)
    }
}

/// Position and heading snapshot handed to the eye each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub pos: Vec2,
    pub heading: f32, // radians, 0 along +X, growing towards +Y
}

pub struct Player {
    pub pos: Vec2,
    pub heading: f32,
    pub speed: f32,      // world units per tick
    pub turn_speed: f32, // radians per tick
    pub radius: f32,     // how far ahead of the body a move is probed
}

impl Player {
    pub fn new(pos: Vec2, heading: f32) -> Self {
        Self {
            pos,
            heading,
            speed: MOVE_SPEED,
            turn_speed: TURN_SPEED,
            radius: PLAYER_RADIUS,
        }
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        Pose {
            pos: self.pos,
            heading: self.heading,
        }
    }

    /// Applies at most one action: forward, backward, turn right, turn left,
    /// in that priority.
    pub fn update(&mut self, controls: Controls, walls: &[Segment]) -> Motion {
        if controls.forward {
            return self.walk(1.0, walls);
        }
        if controls.backward {
            return self.walk(-1.0, walls);
        }

        let yaw_delta = if controls.turn_right {
            self.turn_speed
        } else if controls.turn_left {
            -self.turn_speed
        } else {
            return Motion::Idle;
        };

        self.heading += yaw_delta;
        // Keep heading in [-pi, pi] to avoid float drift
        if self.heading > PI {
            self.heading -= 2.0 * PI;
        }
        if self.heading < -PI {
            self.heading += 2.0 * PI;
        }
        Motion::Turned
    }

    fn walk(&mut self, sign: f32, walls: &[Segment]) -> Motion {
        let dir = Vec2::from_angle(self.heading) * sign;
        let candidate = self.pos + dir * self.speed;

        // swept probe from the current position to just beyond the candidate
        let probe = Segment::new(self.pos, candidate + dir * self.radius);
        if walls.iter().any(|w| w.intersect(&probe).is_some()) {
            log::debug!(
                "move to ({:.1}, {:.1}) rejected by wall",
                candidate.x,
                candidate.y
            );
            return Motion::Blocked;
        }

        self.pos = candidate;
        Motion::Walked
    }
}
