use std::marker::PhantomData;

use thiserror::Error;
use tracing::{debug, warn};

pub use glue_environment::{Environment, Transition};
pub use state::{Reading, State, Vec2};
pub use utils::{ActionDecoder, LandingZone, TableDecoder, Telemetry};

mod state;
mod utils;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LanderError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("decoder reported {field} = {value}, which is out of range")]
    InvalidReading { field: &'static str, value: f64 },
}

/// How readings coming from the decoders are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "state-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum InputPolicy {
    /// Readings are used as they are, even if they make no physical sense
    PassThrough,
    /// Non finite values, angles outside [0, 360) and negative fuel fail the step
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "state-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum LandingZonePolicy {
    /// Ask the provider on every start and step
    Requery,
    /// Ask the provider on start and keep the answer until the next start or cleanup
    PerEpisode,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "state-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[cfg_attr(feature = "state-serde", serde(default))]
pub struct LunarLanderConfiguration {
    pub start_position: Vec2,
    pub full_tank: f64,

    /// Touching down while falling faster than this is a crash
    pub max_descent_speed: f64,
    pub max_lateral_speed: f64,
    /// Allowed tilt in degrees on either side of upright
    pub angle_tolerance: f64,

    pub crash_penalty: f64,
    pub landing_bonus: f64,

    pub input_policy: InputPolicy,
    pub landing_zone_policy: LandingZonePolicy,
}

impl Default for LunarLanderConfiguration {
    fn default() -> Self {
        LunarLanderConfiguration {
            start_position: Vec2::new(100., 20.),
            full_tank: 100.,

            max_descent_speed: 3.,
            max_lateral_speed: 10.,
            angle_tolerance: 5.,

            crash_penalty: -10000.,
            landing_bonus: 1000.,

            input_policy: InputPolicy::PassThrough,
            landing_zone_policy: LandingZonePolicy::Requery,
        }
    }
}

impl LunarLanderConfiguration {
    fn validate(&self) -> Result<(), LanderError> {
        let limits = [
            ("max_descent_speed", self.max_descent_speed),
            ("max_lateral_speed", self.max_lateral_speed),
            ("angle_tolerance", self.angle_tolerance),
        ];

        for (name, value) in limits.iter() {
            if !value.is_finite() || *value < 0. {
                return Err(LanderError::InvalidConfiguration(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if self.angle_tolerance >= 180. {
            return Err(LanderError::InvalidConfiguration(format!(
                "angle_tolerance must be below 180 degrees, got {}",
                self.angle_tolerance
            )));
        }

        if !self.full_tank.is_finite() || self.full_tank <= 0. {
            return Err(LanderError::InvalidConfiguration(format!(
                "full_tank must be positive, got {}",
                self.full_tank
            )));
        }

        let others = [
            ("start_position.x", self.start_position.x),
            ("start_position.y", self.start_position.y),
            ("crash_penalty", self.crash_penalty),
            ("landing_bonus", self.landing_bonus),
        ];

        match others.iter().find(|(_, value)| !value.is_finite()) {
            Some((name, value)) => Err(LanderError::InvalidConfiguration(format!(
                "{} must be finite, got {}",
                name, value
            ))),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrashCause {
    /// Touched down too fast, too tilted or away from the landing zone
    Impact,
    OutOfFuel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Flying,
    Landed,
    Crashed(CrashCause),
}

impl Outcome {
    pub fn classify(state: &State, configuration: &LunarLanderConfiguration) -> Self {
        if state.position.y <= state.landing_zone.y {
            let descending_too_fast = state.velocity.y < -configuration.max_descent_speed;
            let drifting = state.velocity.x < -configuration.max_lateral_speed
                || state.velocity.x > configuration.max_lateral_speed;
            let tilted = state.angle > configuration.angle_tolerance
                && state.angle < 360. - configuration.angle_tolerance;
            #[allow(clippy::float_cmp)]
            let off_target = state.position.x != state.landing_zone.x;

            if descending_too_fast || drifting || tilted || off_target {
                Outcome::Crashed(CrashCause::Impact)
            } else {
                Outcome::Landed
            }
        } else if state.fuel <= 0. {
            Outcome::Crashed(CrashCause::OutOfFuel)
        } else {
            Outcome::Flying
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Flying)
    }

    pub fn reward(&self, state: &State, configuration: &LunarLanderConfiguration) -> f64 {
        match self {
            Outcome::Crashed(_) => configuration.crash_penalty,
            Outcome::Landed => configuration.landing_bonus + state.fuel,
            Outcome::Flying => 0.,
        }
    }
}

pub struct LunarLander<A, Z, D> {
    pub configuration: LunarLanderConfiguration,

    landing_zone: Z,
    decoder: D,

    episode_zone: Option<Vec2>,
    last_state: Option<State>,

    action: PhantomData<fn(&A)>,
}

impl<A, Z, D> LunarLander<A, Z, D>
where
    Z: LandingZone,
    D: ActionDecoder<A>,
{
    pub fn new(landing_zone: Z, decoder: D) -> Self {
        LunarLander {
            configuration: Default::default(),

            landing_zone,
            decoder,

            episode_zone: None,
            last_state: None,

            action: PhantomData,
        }
    }

    pub fn last_state(&self) -> Option<State> {
        self.last_state
    }

    fn current_landing_zone(&mut self) -> Vec2 {
        match (self.configuration.landing_zone_policy, self.episode_zone) {
            (LandingZonePolicy::PerEpisode, Some(zone)) => zone,
            _ => self.landing_zone.landing_zone(),
        }
    }

    fn check_reading(&self, reading: &Reading) -> Result<(), LanderError> {
        if let InputPolicy::PassThrough = self.configuration.input_policy {
            return Ok(());
        }

        let fields = [
            ("velocity.x", reading.velocity.x),
            ("velocity.y", reading.velocity.y),
            ("angle", reading.angle),
            ("position.x", reading.position.x),
            ("position.y", reading.position.y),
            ("fuel", reading.fuel),
        ];

        let invalid = fields
            .iter()
            .find(|(_, value)| !value.is_finite())
            .or_else(|| {
                fields.iter().find(|(field, value)| {
                    (*field == "angle" && !(0. ..360.).contains(value))
                        || (*field == "fuel" && *value < 0.)
                })
            });

        match invalid {
            Some(&(field, value)) => {
                warn!(field, value, "rejecting decoder reading");
                Err(LanderError::InvalidReading { field, value })
            }
            None => Ok(()),
        }
    }
}

impl<A, Z, D> Environment for LunarLander<A, Z, D>
where
    Z: LandingZone,
    D: ActionDecoder<A>,
{
    type Observation = State;
    type Action = A;
    type Configuration = LunarLanderConfiguration;
    type Error = LanderError;

    fn init(&mut self, configuration: LunarLanderConfiguration) -> Result<(), LanderError> {
        configuration.validate()?;
        self.configuration = configuration;
        self.last_state = None;

        Ok(())
    }

    fn start(&mut self) -> State {
        let landing_zone = self.landing_zone.landing_zone();
        self.episode_zone = Some(landing_zone);

        let state = State {
            velocity: Vec2::new(0., 0.),
            angle: 0.,
            position: self.configuration.start_position,
            landing_zone,
            fuel: self.configuration.full_tank,
        };
        debug!(%state, "lander started");

        self.last_state = Some(state);
        state
    }

    fn step(&mut self, action: &A) -> Result<Transition<State>, LanderError> {
        let landing_zone = self.current_landing_zone();
        let reading = utils::decode(&self.decoder, action);
        self.check_reading(&reading)?;

        let state = State::from_reading(reading, landing_zone);
        let outcome = Outcome::classify(&state, &self.configuration);
        let reward = outcome.reward(&state, &self.configuration);
        debug!(%state, ?outcome, reward, "lander stepped");

        self.last_state = Some(state);

        Ok(Transition::new(reward, state, outcome.is_terminal()))
    }

    fn cleanup(&mut self) {
        self.episode_zone = None;
        self.last_state = None;
    }

    fn message(&mut self, message: &str) -> Option<String> {
        match message.trim() {
            "landing_zone" => self
                .last_state
                .map(|state| state.landing_zone)
                .or(self.episode_zone)
                .map(|zone| zone.to_string()),
            "state" => self.last_state.map(|state| state.to_string()),
            "outcome" => self
                .last_state
                .map(|state| format!("{:?}", Outcome::classify(&state, &self.configuration))),
            "configuration" => Some(format!("{:?}", self.configuration)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(velocity: (f64, f64), angle: f64, position: (f64, f64), fuel: f64) -> Reading {
        Reading {
            velocity: velocity.into(),
            angle,
            position: position.into(),
            fuel,
        }
    }

    fn lander(
        zone: (f64, f64),
        readings: Vec<Reading>,
    ) -> LunarLander<usize, Vec2, TableDecoder<usize>> {
        let decoder = readings
            .into_iter()
            .enumerate()
            .fold(TableDecoder::new(Reading::default()), |decoder, (i, r)| {
                decoder.with(i, r)
            });

        LunarLander::new(zone.into(), decoder)
    }

    fn step_once(zone: (f64, f64), r: Reading) -> Transition<State> {
        let mut env = lander(zone, vec![r]);
        env.start();
        env.step(&0).unwrap()
    }

    #[test]
    fn start_is_fixed() {
        let mut env = lander((50., 0.), vec![]);
        let state = env.start();

        assert_eq!(
            state.to_array(),
            [0., 0., 0., 100., 20., 50., 0., 100.]
        );
    }

    #[test]
    fn default_thresholds() {
        let configuration = LunarLanderConfiguration::default();

        assert_eq!(configuration.crash_penalty, -10000.);
        assert_eq!(configuration.landing_bonus, 1000.);
        assert_eq!(configuration.max_descent_speed, 3.);
        assert_eq!(configuration.max_lateral_speed, 10.);
        assert_eq!(configuration.angle_tolerance, 5.);
    }

    #[test]
    fn touchdown_away_from_zone_crashes() {
        let transition = step_once((50., 0.), reading((0., 0.), 0., (2., 0.), 10.));

        assert_eq!(transition.reward, -10000.);
        assert!(transition.terminal);
        assert_eq!(transition.observation.position, Vec2::new(2., 0.));
        assert_eq!(transition.observation.fuel, 10.);
    }

    #[test]
    fn out_of_fuel_in_the_air_crashes() {
        let r = reading((0., -1.), 0., (50., 7.), 0.);
        let transition = step_once((50., 0.), r);

        assert_eq!(transition.reward, -10000.);
        assert!(transition.terminal);
        assert_eq!(
            Outcome::classify(&transition.observation, &Default::default()),
            Outcome::Crashed(CrashCause::OutOfFuel)
        );

        for fuel in [-5., -0.1, 0.].iter() {
            let r = reading((3., 2.), 90., (-20., 1.), *fuel);
            let transition = step_once((0., 0.), r);
            assert!(transition.terminal);
            assert_eq!(transition.reward, -10000.);
        }
    }

    #[test]
    fn perfect_landing_pays_bonus_and_fuel() {
        let transition = step_once((10., 5.), reading((0., 0.), 0., (10., 5.), 40.));

        assert_eq!(transition.reward, 1040.);
        assert!(transition.terminal);
    }

    #[test]
    fn safe_envelope_lands() {
        let cases = vec![
            reading((10., -3.), 5., (10., 5.), 1.),
            reading((-10., 2.), 355., (10., 4.), 12.),
            reading((0., 0.), 359.9, (10., -100.), 0.),
        ];

        for r in cases {
            let transition = step_once((10., 5.), r);
            assert!(transition.terminal);
            assert_eq!(transition.reward, 1000. + r.fuel);
        }
    }

    #[test]
    fn crash_overrides_landing() {
        let cases = vec![
            reading((0., -3.01), 0., (10., 5.), 90.),
            reading((10.5, 0.), 0., (10., 5.), 90.),
            reading((-10.5, 0.), 0., (10., 5.), 90.),
            reading((0., 0.), 5.5, (10., 5.), 90.),
            reading((0., 0.), 354.5, (10., 5.), 90.),
            reading((0., 0.), 0., (10.001, 5.), 90.),
        ];

        for r in cases {
            let transition = step_once((10., 5.), r);
            assert!(transition.terminal);
            assert_eq!(transition.reward, -10000.);
        }
    }

    #[test]
    fn flying_is_free() {
        let transition = step_once((10., 5.), reading((40., -50.), 180., (500., 5.01), 0.5));

        assert!(!transition.terminal);
        assert_eq!(transition.reward, 0.);
    }

    #[test]
    fn zone_is_requeried_by_default() {
        let mut y = 0.;
        let zone = move || {
            y += 10.;
            Vec2::new(0., y)
        };
        let decoder: TableDecoder<()> =
            TableDecoder::new(reading((0., 0.), 0., (0., 15.), 50.));
        let mut env = LunarLander::new(zone, decoder);

        assert_eq!(env.start().landing_zone, Vec2::new(0., 10.));

        let transition = env.step(&()).unwrap();
        assert_eq!(transition.observation.landing_zone, Vec2::new(0., 20.));
        assert_eq!(transition.reward, 1050.);
    }

    #[test]
    fn zone_can_be_held_per_episode() {
        let mut y = 0.;
        let zone = move || {
            y += 10.;
            Vec2::new(0., y)
        };
        let decoder: TableDecoder<()> =
            TableDecoder::new(reading((0., 0.), 0., (0., 15.), 50.));
        let mut env = LunarLander::new(zone, decoder);
        env.init(LunarLanderConfiguration {
            landing_zone_policy: LandingZonePolicy::PerEpisode,
            ..Default::default()
        })
        .unwrap();

        env.start();
        let transition = env.step(&()).unwrap();
        assert_eq!(transition.observation.landing_zone, Vec2::new(0., 10.));
        assert!(!transition.terminal);

        assert_eq!(env.start().landing_zone, Vec2::new(0., 20.));
    }

    #[test]
    fn held_zone_survives_reinit() {
        let mut y = 0.;
        let zone = move || {
            y += 10.;
            Vec2::new(0., y)
        };
        let decoder: TableDecoder<()> =
            TableDecoder::new(reading((0., 0.), 0., (0., 50.), 50.));
        let configuration = LunarLanderConfiguration {
            landing_zone_policy: LandingZonePolicy::PerEpisode,
            ..Default::default()
        };
        let mut env = LunarLander::new(zone, decoder);
        env.init(configuration.clone()).unwrap();

        assert_eq!(env.start().landing_zone, Vec2::new(0., 10.));
        env.init(configuration).unwrap();

        for _ in 0..2 {
            let transition = env.step(&()).unwrap();
            assert_eq!(transition.observation.landing_zone, Vec2::new(0., 10.));
        }
    }

    #[test]
    fn reject_policy_refuses_nonsense() {
        let cases = vec![
            (reading((f64::NAN, 0.), 0., (0., 10.), 5.), "velocity.x"),
            (reading((0., 0.), 360., (0., 10.), 5.), "angle"),
            (reading((0., 0.), -1., (0., 10.), 5.), "angle"),
            (reading((0., 0.), 0., (0., f64::INFINITY), 5.), "position.y"),
            (reading((0., 0.), 0., (0., 10.), -1.), "fuel"),
        ];

        for (r, expected) in cases {
            let mut env = lander((0., 0.), vec![r]);
            env.init(LunarLanderConfiguration {
                input_policy: InputPolicy::Reject,
                ..Default::default()
            })
            .unwrap();
            env.start();

            match env.step(&0) {
                Err(LanderError::InvalidReading { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected a rejected reading, got {:?}", other),
            }
        }
    }

    #[test]
    fn pass_through_keeps_nonsense() {
        let mut env = lander((0., 0.), vec![reading((0., 0.), 720., (0., 10.), -1.)]);
        env.start();

        let transition = env.step(&0).unwrap();
        assert_eq!(transition.observation.angle, 720.);
        assert!(transition.terminal);
    }

    #[test]
    fn init_fails_fast_on_bad_configuration() {
        let mut env = lander((0., 0.), vec![]);

        let bad = vec![
            LunarLanderConfiguration {
                full_tank: 0.,
                ..Default::default()
            },
            LunarLanderConfiguration {
                max_descent_speed: -1.,
                ..Default::default()
            },
            LunarLanderConfiguration {
                angle_tolerance: 180.,
                ..Default::default()
            },
            LunarLanderConfiguration {
                crash_penalty: f64::NEG_INFINITY,
                ..Default::default()
            },
        ];

        for configuration in bad {
            assert!(matches!(
                env.init(configuration),
                Err(LanderError::InvalidConfiguration(_))
            ));
        }
        assert_eq!(env.configuration, LunarLanderConfiguration::default());
    }

    #[test]
    fn messages_report_diagnostics() {
        let mut env = lander((50., 0.), vec![reading((0., 0.), 0., (2., 0.), 10.)]);

        assert_eq!(env.message("state"), None);

        env.start();
        assert_eq!(env.message("landing_zone"), Some("(50, 0)".to_string()));
        assert_eq!(env.message("outcome"), Some("Flying".to_string()));

        env.step(&0).unwrap();
        assert_eq!(env.message("outcome"), Some("Crashed(Impact)".to_string()));
        assert!(env.message("configuration").is_some());
        assert_eq!(env.message("unknown"), None);

        env.cleanup();
        assert_eq!(env.message("state"), None);
    }
}
