mod board;
mod config;
mod game;
mod greedy;
mod planner;
mod render;
mod route;
mod search;
mod session;
mod snake;
mod term;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use crate::config::{DriveMode, SimConfig, DEFAULT_SNAKE_LENGTH, DEFAULT_STOP_KEY, DEFAULT_TICK_MS};
use crate::render::HeadlessRenderer;
use crate::route::PortalBias;
use crate::session::Session;

/// Board position, 1-indexed. Signed so portal approaches can sit one cell
/// past the edge.
pub type Coords = (i16, i16);

// Headless runs have no stop key, so a stall-free loop needs a ceiling
const HEADLESS_TICK_CAP: u64 = 100_000;

#[derive(Parser, Debug)]
#[command(name = "portal-snake", version, about = "Autonomous snake on a board with portals and blocks")]
struct Cli {
    /// How the head picks its next cell.
    #[arg(long, value_enum, default_value_t = DriveMode::Autopilot)]
    mode: DriveMode,

    /// Delay between ticks in milliseconds.
    #[arg(long, default_value_t = DEFAULT_TICK_MS)]
    tick_ms: u64,

    /// Initial snake length.
    #[arg(long, default_value_t = DEFAULT_SNAKE_LENGTH)]
    length: usize,

    /// Grow by one segment after each apple.
    #[arg(long)]
    grow: bool,

    /// Per-portal cost offsets used by the distance estimator.
    #[arg(long, value_enum, default_value_t = PortalBias::Skewed)]
    bias: PortalBias,

    /// Size of the planner's back-off region (defaults to the snake length).
    #[arg(long)]
    fallback_bound: Option<i16>,

    /// Stop after this many moves.
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Replace the fixed apple list with a shuffled one drawn from this seed.
    #[arg(long, value_name = "SEED")]
    random_apples: Option<u64>,

    /// Number of apples in a random plan.
    #[arg(long, default_value_t = 10, requires = "random_apples")]
    apples: usize,

    /// Key that stops the simulation.
    #[arg(long, default_value_t = DEFAULT_STOP_KEY)]
    stop_key: char,

    /// Run without a terminal and print the summary.
    #[arg(long)]
    headless: bool,
}

impl Cli {
    fn into_config(self) -> Result<SimConfig> {
        let mut config = SimConfig {
            snake_length: self.length,
            grow_on_apple: self.grow,
            tick_delay: Duration::from_millis(self.tick_ms),
            portal_bias: self.bias,
            fallback_bound: self.fallback_bound.unwrap_or_else(|| i16::try_from(self.length).unwrap_or(i16::MAX)),
            max_ticks: self.max_ticks,
            stop_key: self.stop_key,
            mode: self.mode,
            ..SimConfig::default()
        };

        if let Some(seed) = self.random_apples {
            config = config.with_random_apples(seed, self.apples)
                .context("Could not build random apple plan")?;
        }

        config.validate().context("Invalid simulation setup")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let headless = cli.headless;
    let config = cli.into_config()?;
    info!(mode = ?config.mode, headless, "Starting portal snake");

    let summary = if headless {
        run_headless(config)?
    } else {
        let mut game = game::SnakeGame::new(config)?;
        game.initialize()?;

        // Always give the terminal back, even when the game failed
        let played = match game.show_intro() {
            Ok(true) => game.play().map(Some),
            Ok(false) => Ok(None),
            Err(e) => Err(e),
        };
        game.restore()?;

        match played? {
            Some(summary) => summary,
            None => return Ok(()),
        }
    };

    println!("{}", summary);
    Ok(())
}

fn run_headless(mut config: SimConfig) -> Result<session::Summary> {
    if config.max_ticks.is_none() {
        config.max_ticks = Some(HEADLESS_TICK_CAP);
    }

    let mut renderer = HeadlessRenderer::new(config.width, config.height);
    let mut session = Session::new(config)?;
    session.draw(&mut renderer)?;
    let summary = session.run(&mut renderer)?;

    for y in 1..=renderer.height() {
        debug!("{}", renderer.row(y));
    }
    Ok(summary)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
