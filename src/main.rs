use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use swarm_plot::app;
use swarm_plot::cli::{Args, Command};
use swarm_plot::config::Config;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if args.plain {
        config.annotate = false;
    }

    match args.command {
        Command::Mobility { projection } => {
            prepare_output(&config)?;
            app::mobility(&config, projection)
        }
        Command::Distance { prefix } => {
            prepare_output(&config)?;
            app::distance(&config, prefix.as_deref())
        }
        Command::Velocity => {
            prepare_output(&config)?;
            app::velocity(&config)
        }
        Command::TotalRx(params) => {
            prepare_output(&config)?;
            app::total_rx(&config, &params)
        }
        Command::Corr { sort_by, json } => {
            println!("{}", app::corr(&config, sort_by.as_deref(), json)?);
            Ok(())
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn prepare_output(config: &Config) -> Result<()> {
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))
}
