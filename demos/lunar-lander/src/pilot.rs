use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::descent::{Command, Descent, DescentConfiguration, DescentError};
use glue_core::Agent;
use glue_environment_lunar_lander::{Reading, State};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Strategy {
    /// Fires engines at random
    Random,
    /// Steers towards the landing zone and brakes before touchdown
    Autopilot,
}

impl Strategy {
    pub fn command<R: Rng + ?Sized>(
        self,
        state: &State,
        configuration: &DescentConfiguration,
        rng: &mut R,
    ) -> Command {
        match self {
            Strategy::Random => match rng.gen_range(0..4) {
                0 => Command::Idle,
                1 => Command::Main,
                2 => Command::RotateLeft,
                _ => Command::RotateRight,
            },
            Strategy::Autopilot => autopilot(state, configuration),
        }
    }
}

fn autopilot(state: &State, configuration: &DescentConfiguration) -> Command {
    let tilt = if state.angle > 180. {
        state.angle - 360.
    } else {
        state.angle
    };
    let dx = state.landing_zone.x - state.position.x;
    let height = state.position.y - state.landing_zone.y;

    // Tilting to negative angles pushes towards positive x
    let wanted_vx = (dx * 0.25).max(-3.).min(3.);
    let wanted_tilt = if height < 4. {
        0.
    } else if state.velocity.x < wanted_vx - 0.5 {
        -15.
    } else if state.velocity.x > wanted_vx + 0.5 {
        15.
    } else {
        0.
    };

    let slack = configuration.rotation_step / 2.;
    if tilt < wanted_tilt - slack {
        return Command::RotateLeft;
    }
    if tilt > wanted_tilt + slack {
        return Command::RotateRight;
    }

    let wanted_vy = if height > 10. { -2.5 } else { -1. };
    #[allow(clippy::float_cmp)]
    let steering = wanted_tilt != 0.;

    if state.velocity.y < wanted_vy || steering {
        Command::Main
    } else {
        Command::Idle
    }
}

#[derive(Debug, Clone)]
pub struct PilotConfiguration {
    pub strategy: Strategy,
    pub descent: DescentConfiguration,
}

impl Default for PilotConfiguration {
    fn default() -> Self {
        PilotConfiguration {
            strategy: Strategy::Autopilot,
            descent: Default::default(),
        }
    }
}

/// Flies the lander itself, its actions are the readings after each tick.
pub struct Pilot {
    configuration: PilotConfiguration,
    descent: Descent,
    rng: StdRng,

    episodes: usize,
    landings: usize,
}

impl Pilot {
    pub fn new(seed: u64) -> Self {
        Pilot {
            configuration: Default::default(),
            descent: Default::default(),
            rng: StdRng::seed_from_u64(seed),

            episodes: 0,
            landings: 0,
        }
    }

    fn act(&mut self, observation: &State) -> Reading {
        let command = self.configuration.strategy.command(
            observation,
            &self.configuration.descent,
            &mut self.rng,
        );

        self.descent.tick(command, &mut self.rng)
    }
}

impl Agent for Pilot {
    type Observation = State;
    type Action = Reading;
    type Configuration = PilotConfiguration;
    type Error = DescentError;

    fn init(&mut self, configuration: PilotConfiguration) -> Result<(), DescentError> {
        self.descent = Descent::new(configuration.descent.clone())?;
        self.configuration = configuration;
        self.episodes = 0;
        self.landings = 0;

        Ok(())
    }

    fn start(&mut self, observation: &State) -> Reading {
        self.descent.reset(observation.reading());
        self.act(observation)
    }

    fn step(&mut self, _reward: f64, observation: &State) -> Reading {
        self.act(observation)
    }

    fn end(&mut self, reward: f64) {
        self.episodes += 1;
        if reward > 0. {
            self.landings += 1;
        }
        debug!(reward, landings = self.landings, "pilot done");
    }

    fn message(&mut self, message: &str) -> Option<String> {
        match message {
            "name" => Some(format!("{:?}", self.configuration.strategy)),
            "landings" => Some(format!("{} of {}", self.landings, self.episodes)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glue_core::{Experiment, ExperimentConfiguration, GlueError, RLGlue};
    use glue_environment_lunar_lander::{LunarLander, Telemetry, Vec2};

    fn state(velocity: (f64, f64), angle: f64, position: (f64, f64)) -> State {
        State {
            velocity: velocity.into(),
            angle,
            position: position.into(),
            landing_zone: Vec2::new(100., 0.),
            fuel: 50.,
        }
    }

    #[test]
    fn autopilot_brakes_when_falling_fast() {
        let c = DescentConfiguration::default();

        assert_eq!(autopilot(&state((0., -4.), 0., (100., 8.)), &c), Command::Main);
        assert_eq!(autopilot(&state((0., -0.5), 0., (100., 8.)), &c), Command::Idle);
    }

    #[test]
    fn autopilot_levels_out_near_ground() {
        let c = DescentConfiguration::default();

        assert_eq!(
            autopilot(&state((0., -1.), 20., (100., 2.)), &c),
            Command::RotateRight
        );
        assert_eq!(
            autopilot(&state((0., -1.), 340., (100., 2.)), &c),
            Command::RotateLeft
        );
    }

    #[test]
    fn autopilot_leans_towards_zone() {
        let c = DescentConfiguration::default();

        // zone is to the left, lean to positive angles
        assert_eq!(
            autopilot(&state((0., 0.), 0., (130., 30.)), &c),
            Command::RotateLeft
        );
        assert_eq!(
            autopilot(&state((0., 0.), 15., (130., 30.)), &c),
            Command::Main
        );
        // zone is to the right
        assert_eq!(
            autopilot(&state((0., 0.), 0., (70., 30.)), &c),
            Command::RotateRight
        );
    }

    #[test]
    fn flies_through_the_glue() {
        let lander = LunarLander::new(Vec2::new(100., 0.), Telemetry);
        let mut glue = RLGlue::new(lander, Pilot::new(11));
        glue.init(PilotConfiguration::default(), Default::default())
            .unwrap();

        let terminal = glue.episode(400).unwrap();
        let last = glue.environment().last_state().unwrap();

        assert!(glue.steps() <= 400);
        assert!(last.fuel <= 100.);
        assert_eq!(glue.episodes(), if terminal { 1 } else { 0 });
        assert_eq!(glue.agent_message("name"), Some("Autopilot".to_string()));
        assert_eq!(glue.env_message("landing_zone"), Some("(100, 0)".to_string()));
    }

    #[test]
    fn random_pilot_plays_many_episodes() {
        let lander = LunarLander::new(Vec2::new(60., 0.), Telemetry);
        let mut glue = RLGlue::new(lander, Pilot::new(5));
        glue.init(
            PilotConfiguration {
                strategy: Strategy::Random,
                ..Default::default()
            },
            Default::default(),
        )
        .unwrap();

        let summaries = glue.run_episodes(5, 200).unwrap();
        let terminal = summaries.iter().filter(|s| s.terminal).count();

        assert_eq!(summaries.len(), 5);
        assert_eq!(glue.episodes(), terminal);
        assert_eq!(
            glue.agent_message("landings"),
            Some(format!(
                "{} of {}",
                summaries.iter().filter(|s| s.total_reward > 0.).count(),
                terminal
            ))
        );
    }

    fn windy_glue(
        seed: u64,
    ) -> Result<RLGlue<LunarLander<Reading, Vec2, Telemetry>, Pilot>, GlueError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let landing_zone = Vec2::new(rng.gen_range(40..=160) as f64, 0.);

        let mut glue = RLGlue::new(
            LunarLander::new(landing_zone, Telemetry),
            Pilot::new(rng.gen()),
        );
        glue.init(
            PilotConfiguration {
                strategy: Strategy::Random,
                descent: DescentConfiguration {
                    wind: 0.5,
                    ..Default::default()
                },
            },
            Default::default(),
        )?;

        Ok(glue)
    }

    #[test]
    fn same_seed_replays_the_experiment() {
        let mut experiment = Experiment::new();
        experiment.set_configuration(ExperimentConfiguration {
            runs: 3,
            episodes_per_run: 4,
            max_steps: 100,
            base_seed: Some(17),
        });

        let first = experiment.run(windy_glue).unwrap();
        let second = experiment.run(windy_glue).unwrap();

        assert_eq!(first.len(), 3);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.seed, b.seed);
            assert_eq!(a.episodes, b.episodes);
            assert_ne!(a.id, b.id);
        }
    }
}
