mod error;
mod experiment;
mod glue;

pub use error::{BoxError, GlueError};
pub use experiment::*;
pub use glue::*;
pub use glue_environment::{Agent, Environment, Transition};
