use rand::Rng;
use rand_distr::{Distribution, Normal};
use thiserror::Error;

use glue_environment_lunar_lander::{Reading, Vec2};

#[derive(Error, Debug)]
pub enum DescentError {
    #[error("invalid descent configuration: {0}")]
    InvalidConfiguration(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Idle,
    Main,
    /// Counter clockwise, increases the angle
    RotateLeft,
    RotateRight,
}

#[derive(Debug, Clone)]
pub struct DescentConfiguration {
    pub gravity: f64,
    pub time_step: f64,

    pub main_thrust: f64,
    pub rotation_step: f64,

    /// Fuel burnt by one tick of the main engine
    pub main_burn: f64,
    pub side_burn: f64,

    /// Standard deviation of the horizontal wind gusts, zero for still air
    pub wind: f64,
}

impl Default for DescentConfiguration {
    fn default() -> Self {
        DescentConfiguration {
            gravity: 1.62,
            time_step: 0.5,

            main_thrust: 4.,
            rotation_step: 5.,

            main_burn: 1.,
            side_burn: 0.25,

            wind: 0.,
        }
    }
}

/// Point mass lander in two dimensions.
///
/// Positions are reported rounded to whole units, that is the resolution of the landing zone.
pub struct Descent {
    configuration: DescentConfiguration,
    wind: Option<Normal<f64>>,

    velocity: Vec2,
    angle: f64,
    position: Vec2,
    fuel: f64,
}

impl Descent {
    pub fn new(configuration: DescentConfiguration) -> Result<Self, DescentError> {
        let positive = [
            ("gravity", configuration.gravity),
            ("time_step", configuration.time_step),
        ];
        let non_negative = [
            ("main_thrust", configuration.main_thrust),
            ("rotation_step", configuration.rotation_step),
            ("main_burn", configuration.main_burn),
            ("side_burn", configuration.side_burn),
            ("wind", configuration.wind),
        ];

        for (name, value) in positive.iter() {
            if !value.is_finite() || *value <= 0. {
                return Err(DescentError::InvalidConfiguration(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        for (name, value) in non_negative.iter() {
            if !value.is_finite() || *value < 0. {
                return Err(DescentError::InvalidConfiguration(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }

        let wind = if configuration.wind > 0. {
            Some(
                Normal::new(0., configuration.wind)
                    .map_err(|e| DescentError::InvalidConfiguration(e.to_string()))?,
            )
        } else {
            None
        };

        Ok(Descent {
            configuration,
            wind,

            velocity: Vec2::default(),
            angle: 0.,
            position: Vec2::default(),
            fuel: 0.,
        })
    }

    pub fn reset(&mut self, reading: Reading) {
        self.velocity = reading.velocity;
        self.angle = reading.angle;
        self.position = reading.position;
        self.fuel = reading.fuel;
    }

    pub fn tick<R: Rng + ?Sized>(&mut self, command: Command, rng: &mut R) -> Reading {
        let c = &self.configuration;
        let mut thrust = 0.;
        let mut burn = 0.;

        if self.fuel > 0. {
            match command {
                Command::Idle => {}
                Command::Main => {
                    thrust = c.main_thrust;
                    burn = c.main_burn;
                }
                Command::RotateLeft => {
                    self.angle += c.rotation_step;
                    burn = c.side_burn;
                }
                Command::RotateRight => {
                    self.angle -= c.rotation_step;
                    burn = c.side_burn;
                }
            }
        }
        self.angle = self.angle.rem_euclid(360.);
        // rem_euclid rounds tiny negative angles up to exactly 360
        if self.angle >= 360. {
            self.angle = 0.;
        }

        let theta = self.angle.to_radians();
        let gust = match &self.wind {
            Some(wind) => wind.sample(rng),
            None => 0.,
        };
        let ax = -thrust * theta.sin() + gust;
        let ay = thrust * theta.cos() - c.gravity;

        self.velocity.x += ax * c.time_step;
        self.velocity.y += ay * c.time_step;
        self.position.x += self.velocity.x * c.time_step;
        self.position.y += self.velocity.y * c.time_step;
        self.fuel = (self.fuel - burn).max(0.);

        self.reading()
    }

    pub fn reading(&self) -> Reading {
        Reading {
            velocity: self.velocity,
            angle: self.angle,
            position: Vec2::new(self.position.x.round(), self.position.y.round()),
            fuel: self.fuel,
        }
    }
}

impl Default for Descent {
    fn default() -> Self {
        Descent {
            configuration: Default::default(),
            wind: None,

            velocity: Vec2::default(),
            angle: 0.,
            position: Vec2::default(),
            fuel: 0.,
        }
    }
}
