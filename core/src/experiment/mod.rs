use rand::random;
use rayon::prelude::*;
use tracing::info;
use uuid::Uuid;

use crate::error::GlueError;
use crate::glue::{EpisodeSummary, RLGlue};
pub use configuration::ExperimentConfiguration;
use glue_environment::{Agent, Environment};

mod configuration;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "summary-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct RunSummary {
    pub id: Uuid,
    pub seed: u64,
    pub episodes: Vec<EpisodeSummary>,
}

impl RunSummary {
    pub fn mean_return(&self) -> f64 {
        if self.episodes.is_empty() {
            return 0.;
        }

        self.episodes.iter().map(|e| e.total_reward).sum::<f64>() / self.episodes.len() as f64
    }

    pub fn terminal_episodes(&self) -> usize {
        self.episodes.iter().filter(|e| e.terminal).count()
    }
}

/// Plays several independent runs in parallel, every run owns its own harness.
pub struct Experiment {
    configuration: ExperimentConfiguration,
}

impl Experiment {
    pub fn new() -> Self {
        Experiment {
            configuration: Default::default(),
        }
    }

    pub fn set_configuration(&mut self, configuration: ExperimentConfiguration) {
        self.configuration = configuration;
    }

    pub fn configuration(&self) -> &ExperimentConfiguration {
        &self.configuration
    }

    /// Builds one harness per seed with `factory` and plays the configured episodes on it.
    ///
    /// Summaries come back in seed order. The first failing run aborts the experiment.
    pub fn run<E, A, F>(&self, factory: F) -> Result<Vec<RunSummary>, GlueError>
    where
        E: Environment,
        E::Action: Clone,
        A: Agent<Observation = E::Observation, Action = E::Action>,
        F: Fn(u64) -> Result<RLGlue<E, A>, GlueError> + Sync,
    {
        let ExperimentConfiguration {
            runs,
            episodes_per_run,
            max_steps,
            base_seed,
        } = self.configuration.clone();
        let base_seed = base_seed.unwrap_or_else(random);

        (0..runs)
            .into_par_iter()
            .map(|i| {
                let seed = base_seed.wrapping_add(i as u64);

                let mut glue = factory(seed)?;
                let episodes = glue.run_episodes(episodes_per_run, max_steps)?;
                glue.cleanup();

                let summary = RunSummary {
                    id: Uuid::new_v4(),
                    seed,
                    episodes,
                };
                info!(
                    seed,
                    mean_return = summary.mean_return(),
                    terminal_episodes = summary.terminal_episodes(),
                    "run finished"
                );

                Ok(summary)
            })
            .collect()
    }
}

impl Default for Experiment {
    fn default() -> Self {
        Experiment::new()
    }
}
