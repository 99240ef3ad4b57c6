use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum GlueError {
    #[error("agent failed to initialise")]
    AgentInit(#[source] BoxError),
    #[error("environment failed to initialise")]
    EnvironmentInit(#[source] BoxError),
    #[error("environment failed to step")]
    Environment(#[source] BoxError),
    /// `step` was called before `start`, or after a terminal step
    #[error("no episode is running, call start first")]
    EpisodeNotStarted,
}
