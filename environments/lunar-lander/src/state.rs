use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "state-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from((x, y): (f64, f64)) -> Self {
        Vec2 { x, y }
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Everything the decoders report about the lander after an action
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "state-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Reading {
    pub velocity: Vec2,
    /// Degrees in [0, 360)
    pub angle: f64,
    pub position: Vec2,
    pub fuel: f64,
}

/// The lander state, also used as the observation handed to agents.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "state-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct State {
    pub velocity: Vec2,
    pub angle: f64,
    pub position: Vec2,
    pub landing_zone: Vec2,
    pub fuel: f64,
}

impl State {
    pub fn from_reading(reading: Reading, landing_zone: Vec2) -> Self {
        State {
            velocity: reading.velocity,
            angle: reading.angle,
            position: reading.position,
            landing_zone,
            fuel: reading.fuel,
        }
    }

    pub fn reading(&self) -> Reading {
        Reading {
            velocity: self.velocity,
            angle: self.angle,
            position: self.position,
            fuel: self.fuel,
        }
    }

    /// (vel_x, vel_y, angle, pos_x, pos_y, land_x, land_y, fuel)
    pub fn to_array(&self) -> [f64; 8] {
        [
            self.velocity.x,
            self.velocity.y,
            self.angle,
            self.position.x,
            self.position.y,
            self.landing_zone.x,
            self.landing_zone.y,
            self.fuel,
        ]
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "velocity {} angle {} position {} landing zone {} fuel {}",
            self.velocity, self.angle, self.position, self.landing_zone, self.fuel
        )
    }
}
