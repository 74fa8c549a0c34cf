use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pairdrift::{
    config::Config,
    driver::Driver,
    engine::Simulation,
    render::{JsonRenderer, LogRenderer, Renderer, TextRenderer},
};
use std::{io, path::PathBuf, time::Duration};

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    /// TOML configuration file (defaults apply when absent).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the simulation.
    Run {
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        ticks: Option<u64>,

        #[arg(long)]
        interval_ms: Option<u64>,

        #[arg(long, value_enum, default_value_t = RenderMode::Log)]
        render: RenderMode,
    },

    /// Validate the configuration and exit.
    Check,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RenderMode {
    Log,
    Json,
    Text,
}

const TEXT_WIDTH: usize = 61;

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mut cfg = match &args.config {
        Some(file) => Config::from_file(file).context("failed to construct cfg")?,
        None => Config::default(),
    };

    match args.command {
        Command::Run {
            seed,
            ticks,
            interval_ms,
            render,
        } => {
            cfg.driver.seed = seed.or(cfg.driver.seed);
            cfg.driver.max_ticks = ticks.or(cfg.driver.max_ticks);
            cfg.driver.tick_interval_ms = interval_ms.unwrap_or(cfg.driver.tick_interval_ms);
            log::info!("{cfg:#?}");
            run_simulation(&cfg, render)?;
        }
        Command::Check => {
            cfg.validate().context("failed to validate config")?;
            log::info!("{cfg:#?}");
        }
    }

    Ok(())
}

fn run_simulation(cfg: &Config, render: RenderMode) -> Result<()> {
    let mut sim = match cfg.driver.seed {
        Some(seed) => Simulation::from_seed(cfg.model.clone(), seed),
        None => Simulation::from_os_rng(cfg.model.clone()),
    }
    .context("failed to construct simulation")?;

    let driver = Driver::new(
        Duration::from_millis(cfg.driver.tick_interval_ms),
        cfg.driver.max_ticks,
    );

    let mut renderer: Box<dyn Renderer> = match render {
        RenderMode::Log => Box::new(LogRenderer),
        RenderMode::Json => Box::new(JsonRenderer::new(io::stdout().lock())),
        RenderMode::Text => Box::new(TextRenderer::new(io::stdout().lock(), TEXT_WIDTH)),
    };

    driver
        .run(&mut sim, renderer.as_mut())
        .context("failed to run simulation")?;

    log::info!(
        "final state: {} A and {} B entities after {} ticks (learning rate {})",
        sim.pop_a().len(),
        sim.pop_b().len(),
        sim.n_ticks(),
        sim.cfg().learning_rate
    );

    Ok(())
}
