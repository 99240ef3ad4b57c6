use tracing::{debug, info};

use crate::error::GlueError;
use glue_environment::{Agent, Environment, Transition};
pub use reporter::{Hook, Reporter};

mod reporter;

/// What a single call to [`RLGlue::step`] produced
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome<O, A> {
    pub reward: f64,
    pub observation: O,
    /// The agent's next action, `None` once the episode is over
    pub action: Option<A>,
    pub terminal: bool,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "summary-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub steps: usize,
    pub total_reward: f64,
    /// False when the episode was cut off by the step limit
    pub terminal: bool,
}

/// Drives an agent and an environment through episodes and keeps the run statistics.
pub struct RLGlue<E: Environment, A> {
    environment: E,
    agent: A,

    total_reward: f64,
    last_action: Option<E::Action>,
    num_steps: usize,
    num_episodes: usize,

    reporter: Reporter,
}

impl<E, A> RLGlue<E, A>
where
    E: Environment,
    E::Action: Clone,
    A: Agent<Observation = E::Observation, Action = E::Action>,
{
    pub fn new(environment: E, agent: A) -> Self {
        RLGlue {
            environment,
            agent,

            total_reward: 0.,
            last_action: None,
            num_steps: 0,
            num_episodes: 0,

            reporter: Reporter::new(),
        }
    }

    pub fn init(
        &mut self,
        agent_configuration: A::Configuration,
        env_configuration: E::Configuration,
    ) -> Result<(), GlueError> {
        // A failed init must not leave a running episode behind
        self.total_reward = 0.;
        self.last_action = None;
        self.num_steps = 0;
        self.num_episodes = 0;

        self.environment
            .init(env_configuration)
            .map_err(|e| GlueError::EnvironmentInit(Box::new(e)))?;
        self.agent
            .init(agent_configuration)
            .map_err(|e| GlueError::AgentInit(Box::new(e)))?;

        Ok(())
    }

    /// Starts an episode and returns the first observation with the agent's first action.
    pub fn start(&mut self) -> (E::Observation, E::Action) {
        let observation = self.env_start();
        let action = self.agent.start(&observation);
        self.last_action = Some(action.clone());

        (observation, action)
    }

    /// Feeds the held action to the environment, then lets the agent either act again or finish.
    ///
    /// Fails with [`GlueError::EpisodeNotStarted`] when there is no held action, that is
    /// before the first `start` or after a terminal step.
    pub fn step(&mut self) -> Result<StepOutcome<E::Observation, E::Action>, GlueError> {
        let action = self
            .last_action
            .take()
            .ok_or(GlueError::EpisodeNotStarted)?;

        let Transition {
            reward,
            observation,
            terminal,
        } = match self.env_step(&action) {
            Ok(transition) => transition,
            Err(e) => {
                self.last_action = Some(action);
                return Err(e);
            }
        };

        let action = if terminal {
            self.agent.end(reward);
            None
        } else {
            let next = self.agent.step(reward, &observation);
            self.last_action = Some(next.clone());
            Some(next)
        };

        Ok(StepOutcome {
            reward,
            observation,
            action,
            terminal,
        })
    }

    /// Runs one episode. With a non zero `max_steps` the episode is cut off once
    /// `steps()` reaches it. Returns whether the episode reached a terminal state.
    pub fn episode(&mut self, max_steps: usize) -> Result<bool, GlueError> {
        let mut is_terminal = false;

        self.start();

        while !is_terminal && (max_steps == 0 || self.num_steps < max_steps) {
            is_terminal = self.step()?.terminal;
        }

        if is_terminal {
            info!(
                episode = self.num_episodes,
                steps = self.num_steps,
                total_reward = self.total_reward,
                "episode finished"
            );
        } else {
            info!(
                steps = self.num_steps,
                total_reward = self.total_reward,
                "episode cut off"
            );
        }

        Ok(is_terminal)
    }

    /// Runs `count` episodes back to back, reporting each one to the registered hooks.
    pub fn run_episodes(
        &mut self,
        count: usize,
        max_steps: usize,
    ) -> Result<Vec<EpisodeSummary>, GlueError> {
        let mut summaries = Vec::with_capacity(count);

        for i in 1..=count {
            let terminal = self.episode(max_steps)?;
            let summary = EpisodeSummary {
                episode: i,
                steps: self.num_steps,
                total_reward: self.total_reward,
                terminal,
            };

            self.reporter.report(i, &summary);
            summaries.push(summary);
        }

        Ok(summaries)
    }

    pub fn add_hook<F>(&mut self, every: usize, hook: F)
    where
        F: FnMut(usize, &EpisodeSummary) + 'static,
    {
        self.reporter.register(every, hook);
    }

    pub fn cleanup(&mut self) {
        self.environment.cleanup();
        self.agent.cleanup();
    }

    pub fn agent_message(&mut self, message: &str) -> Option<String> {
        self.agent.message(message)
    }

    pub fn env_message(&mut self, message: &str) -> Option<String> {
        self.environment.message(message)
    }

    pub fn agent_start(&mut self, observation: &E::Observation) -> E::Action {
        self.agent.start(observation)
    }

    pub fn agent_step(&mut self, reward: f64, observation: &E::Observation) -> E::Action {
        self.agent.step(reward, observation)
    }

    pub fn agent_end(&mut self, reward: f64) {
        self.agent.end(reward)
    }

    /// Starts the environment alone, resetting the episode statistics.
    pub fn env_start(&mut self) -> E::Observation {
        self.total_reward = 0.;
        self.num_steps = 1;

        self.environment.start()
    }

    /// Steps the environment alone and updates the statistics as [`RLGlue::step`] would.
    pub fn env_step(
        &mut self,
        action: &E::Action,
    ) -> Result<Transition<E::Observation>, GlueError> {
        let transition = self
            .environment
            .step(action)
            .map_err(|e| GlueError::Environment(Box::new(e)))?;

        self.total_reward += transition.reward;

        if transition.terminal {
            self.num_episodes += 1;
        } else {
            self.num_steps += 1;
        }
        debug!(
            reward = transition.reward,
            terminal = transition.terminal,
            steps = self.num_steps,
            "environment stepped"
        );

        Ok(transition)
    }

    /// The reward accumulated in the current episode
    pub fn return_value(&self) -> f64 {
        self.total_reward
    }

    pub fn steps(&self) -> usize {
        self.num_steps
    }

    pub fn episodes(&self) -> usize {
        self.num_episodes
    }

    pub fn environment(&self) -> &E {
        &self.environment
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }
}
