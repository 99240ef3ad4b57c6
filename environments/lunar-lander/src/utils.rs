use std::collections::HashMap;
use std::hash::Hash;

use crate::state::{Reading, Vec2};

/// Supplies the landing zone coordinates, queried on every `start` and `step`.
pub trait LandingZone {
    fn landing_zone(&mut self) -> Vec2;
}

impl LandingZone for Vec2 {
    fn landing_zone(&mut self) -> Vec2 {
        *self
    }
}

impl<F> LandingZone for F
where
    F: FnMut() -> Vec2,
{
    fn landing_zone(&mut self) -> Vec2 {
        self()
    }
}

/// Turns an opaque action into the physical readings of the lander.
///
/// Each lookup is independent and should be a pure function of the action.
pub trait ActionDecoder<A> {
    fn velocity(&self, action: &A) -> Vec2;
    fn angle(&self, action: &A) -> f64;
    fn position(&self, action: &A) -> Vec2;
    fn fuel(&self, action: &A) -> f64;
}

/// Canned readings keyed by action, unknown actions get the fallback
#[derive(Debug, Clone)]
pub struct TableDecoder<A: Eq + Hash> {
    readings: HashMap<A, Reading>,
    fallback: Reading,
}

impl<A: Eq + Hash> TableDecoder<A> {
    pub fn new(fallback: Reading) -> Self {
        TableDecoder {
            readings: HashMap::new(),
            fallback,
        }
    }

    pub fn with(mut self, action: A, reading: Reading) -> Self {
        self.insert(action, reading);
        self
    }

    pub fn insert(&mut self, action: A, reading: Reading) {
        self.readings.insert(action, reading);
    }

    fn lookup(&self, action: &A) -> &Reading {
        self.readings.get(action).unwrap_or(&self.fallback)
    }
}

impl<A: Eq + Hash> ActionDecoder<A> for TableDecoder<A> {
    fn velocity(&self, action: &A) -> Vec2 {
        self.lookup(action).velocity
    }

    fn angle(&self, action: &A) -> f64 {
        self.lookup(action).angle
    }

    fn position(&self, action: &A) -> Vec2 {
        self.lookup(action).position
    }

    fn fuel(&self, action: &A) -> f64 {
        self.lookup(action).fuel
    }
}

/// For actions that already are the readings, e.g. when the agent side runs the physics.
#[derive(Debug, Clone, Copy, Default)]
pub struct Telemetry;

impl ActionDecoder<Reading> for Telemetry {
    fn velocity(&self, action: &Reading) -> Vec2 {
        action.velocity
    }

    fn angle(&self, action: &Reading) -> f64 {
        action.angle
    }

    fn position(&self, action: &Reading) -> Vec2 {
        action.position
    }

    fn fuel(&self, action: &Reading) -> f64 {
        action.fuel
    }
}

pub(crate) fn decode<A, D: ActionDecoder<A>>(decoder: &D, action: &A) -> Reading {
    Reading {
        velocity: decoder.velocity(action),
        angle: decoder.angle(action),
        position: decoder.position(action),
        fuel: decoder.fuel(action),
    }
}
