use std::fs::read_to_string;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

use descent::DescentConfiguration;
use glue_core::{Experiment, ExperimentConfiguration, RLGlue};
use glue_environment_lunar_lander::{LunarLander, LunarLanderConfiguration, Telemetry, Vec2};
use glue_export::to_file;
use pilot::{Pilot, PilotConfiguration, Strategy};

mod descent;
mod pilot;

/// Lands lunar landers through the RL glue
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Episodes played in every run
    #[arg(long, default_value_t = 10)]
    episodes: usize,

    /// Step limit of an episode, 0 for none
    #[arg(long, default_value_t = 500)]
    max_steps: usize,

    /// Independent runs, played in parallel
    #[arg(long, default_value_t = 1)]
    runs: usize,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = Strategy::Autopilot)]
    agent: Strategy,

    /// Standard deviation of horizontal wind gusts
    #[arg(long, default_value_t = 0.)]
    wind: f64,

    /// JSON file with the lunar lander configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the run summaries to this file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Log a progress line every this many episodes
    #[arg(long, default_value_t = 1)]
    report_every: usize,
}

fn load_configuration(path: &Option<PathBuf>) -> Result<LunarLanderConfiguration> {
    match path {
        Some(path) => {
            let text = read_to_string(path)
                .with_context(|| format!("could not read {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("could not parse {}", path.display()))
        }
        None => Ok(Default::default()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let lander_configuration = load_configuration(&args.config)?;
    let pilot_configuration = PilotConfiguration {
        strategy: args.agent,
        descent: DescentConfiguration {
            wind: args.wind,
            ..Default::default()
        },
    };
    let report_every = args.report_every;

    let mut experiment = Experiment::new();
    experiment.set_configuration(ExperimentConfiguration {
        runs: args.runs,
        episodes_per_run: args.episodes,
        max_steps: args.max_steps,
        base_seed: args.seed,
    });

    let summaries = experiment.run(|seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        let landing_zone = Vec2::new(rng.gen_range(40..=160) as f64, 0.);

        let mut glue = RLGlue::new(
            LunarLander::new(landing_zone, Telemetry),
            Pilot::new(rng.gen()),
        );
        glue.init(pilot_configuration.clone(), lander_configuration.clone())?;
        glue.add_hook(report_every, move |episode, summary| {
            info!(
                seed,
                episode,
                steps = summary.steps,
                total_reward = summary.total_reward,
                terminal = summary.terminal,
                "episode done"
            );
        });

        Ok(glue)
    })?;

    for summary in &summaries {
        println!(
            "run {} (seed {}): mean return {:.1}, {} of {} episodes ended, {} landings",
            summary.id,
            summary.seed,
            summary.mean_return(),
            summary.terminal_episodes(),
            summary.episodes.len(),
            summary
                .episodes
                .iter()
                .filter(|e| e.total_reward > 0.)
                .count()
        );
    }

    if let Some(path) = &args.export {
        to_file(path, &summaries)
            .with_context(|| format!("could not export to {}", path.display()))?;
        info!(path = %path.display(), "summaries exported");
    }

    Ok(())
}
