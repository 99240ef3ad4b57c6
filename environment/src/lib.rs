use std::error::Error;

/// What an environment hands back after acting on an action
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "transition-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Transition<O> {
    pub reward: f64,
    pub observation: O,
    pub terminal: bool,
}

impl<O> Transition<O> {
    pub fn new(reward: f64, observation: O, terminal: bool) -> Self {
        Transition {
            reward,
            observation,
            terminal,
        }
    }
}

pub trait Environment {
    type Observation;
    type Action;
    type Configuration;
    type Error: Error + Send + Sync + 'static;

    fn init(&mut self, configuration: Self::Configuration) -> Result<(), Self::Error>;

    /// Begins an episode and returns the first observation
    fn start(&mut self) -> Self::Observation;
    fn step(&mut self, action: &Self::Action) -> Result<Transition<Self::Observation>, Self::Error>;

    fn cleanup(&mut self) {}

    /// Out of band query channel, it must not change what `step` returns
    fn message(&mut self, _message: &str) -> Option<String> {
        None
    }
}

pub trait Agent {
    type Observation;
    type Action;
    type Configuration;
    type Error: Error + Send + Sync + 'static;

    fn init(&mut self, configuration: Self::Configuration) -> Result<(), Self::Error>;

    fn start(&mut self, observation: &Self::Observation) -> Self::Action;
    fn step(&mut self, reward: f64, observation: &Self::Observation) -> Self::Action;
    fn end(&mut self, reward: f64);

    fn cleanup(&mut self) {}

    fn message(&mut self, _message: &str) -> Option<String> {
        None
    }
}
