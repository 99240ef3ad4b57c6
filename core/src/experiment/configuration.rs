use std::default::Default;

/// Holds configuration options of a multi run experiment
#[derive(Debug, Clone)]
pub struct ExperimentConfiguration {
    /// The number of independent runs, each gets its own agent and environment
    pub runs: usize,

    /// The number of episodes played in every run
    pub episodes_per_run: usize,

    /// The step limit of each episode, zero means no limit
    pub max_steps: usize,

    /// Run `i` is seeded with `base_seed + i`, a random base is drawn when missing
    pub base_seed: Option<u64>,
}

impl Default for ExperimentConfiguration {
    fn default() -> Self {
        ExperimentConfiguration {
            runs: 1,
            episodes_per_run: 100,
            max_steps: 1000,
            base_seed: None,
        }
    }
}
