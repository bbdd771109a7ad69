//! Command-line runner: configure, drive the engine tick by tick, and feed
//! each snapshot to the log exporter and the text renderer.

mod export;
mod render;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use eco_core::SimulationConfig;
use eco_world::{Simulation, SnapshotSink, WorldSnapshot};
use export::{LogFormat, LogHeader, SnapshotLog};
use render::TextRenderer;
use std::fs::File;
use std::io::{BufWriter, Stdout};
use std::path::PathBuf;
use tokio::signal;
use tokio::time::{interval, Duration, Interval, MissedTickBehavior};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "eco-runner", version, about = "Run a grid ecosystem simulation")]
struct Cli {
    /// JSON configuration file; flags below override its values.
    #[arg(long, env = "ECO_CONFIG")]
    config: Option<PathBuf>,

    /// Number of ticks to run.
    #[arg(long, env = "ECO_TICKS")]
    ticks: Option<u64>,

    /// Seed for terrain, placement and every rule roll.
    #[arg(long, env = "ECO_SEED")]
    seed: Option<u64>,

    #[arg(long)]
    width: Option<i32>,

    #[arg(long)]
    height: Option<i32>,

    /// Initial plant count.
    #[arg(long)]
    plants: Option<usize>,

    /// Initial animal count.
    #[arg(long)]
    animals: Option<usize>,

    /// Initial decomposer count.
    #[arg(long)]
    decomposers: Option<usize>,

    /// Log population metrics every N ticks (0 disables).
    #[arg(long)]
    report_interval: Option<u64>,

    /// Write every snapshot to this file.
    #[arg(long, env = "ECO_SNAPSHOT_LOG")]
    snapshot_log: Option<PathBuf>,

    /// Encoding of the snapshot log.
    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    format: LogFormat,

    /// Print a text frame of the grid after every tick.
    #[arg(long)]
    render: bool,

    /// Wait this long between ticks (0 runs flat out).
    #[arg(long, env = "ECO_TICK_INTERVAL_MS", default_value_t = 0)]
    tick_interval_ms: u64,

    /// Emit logs as JSON.
    #[arg(long, env = "ECO_LOG_JSON")]
    log_json: bool,
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied
    fn simulation_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                SimulationConfig::from_json(&json)
                    .with_context(|| format!("failed to parse config {}", path.display()))?
            }
            None => SimulationConfig::default(),
        };

        if let Some(ticks) = self.ticks {
            config.num_ticks = ticks;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(width) = self.width {
            config.world.width = width;
        }
        if let Some(height) = self.height {
            config.world.height = height;
        }
        if let Some(plants) = self.plants {
            config.population.plants = plants;
        }
        if let Some(animals) = self.animals {
            config.population.animals = animals;
        }
        if let Some(decomposers) = self.decomposers {
            config.population.decomposers = decomposers;
        }
        if let Some(report_interval) = self.report_interval {
            config.report_interval = report_interval;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

/// Everything that receives snapshots during a run
struct Outputs {
    log: Option<SnapshotLog<BufWriter<File>>>,
    renderer: Option<TextRenderer<Stdout>>,
}

impl Outputs {
    fn open(cli: &Cli, config: &SimulationConfig) -> Result<Self> {
        let log = match &cli.snapshot_log {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                let header = LogHeader::new(config);
                let log = SnapshotLog::create(BufWriter::new(file), cli.format, &header)
                    .context("failed to write snapshot log header")?;
                info!(path = %path.display(), format = ?cli.format, "Writing snapshot log");
                Some(log)
            }
            None => None,
        };
        let renderer = cli.render.then(|| TextRenderer::new(std::io::stdout()));

        Ok(Self { log, renderer })
    }

    fn record(&mut self, snapshot: &WorldSnapshot) -> Result<()> {
        if let Some(log) = &mut self.log {
            log.record(snapshot).context("failed to append to snapshot log")?;
        }
        if let Some(renderer) = &mut self.renderer {
            renderer.record(snapshot).context("failed to render frame")?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(log) = &mut self.log {
            log.flush().context("failed to flush snapshot log")?;
            info!(records = log.records(), "Snapshot log closed");
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing(cli.log_json)?;

    let config = cli.simulation_config()?;
    info!(
        ticks = config.num_ticks,
        seed = config.seed,
        width = config.world.width,
        height = config.world.height,
        "Starting eco-runner"
    );

    let mut sim = Simulation::new(config.clone()).context("failed to build simulation")?;
    let mut outputs = Outputs::open(&cli, &config)?;
    outputs.record(&sim.snapshot())?;

    let mut pacing = (cli.tick_interval_ms > 0).then(|| {
        let mut pacing = interval(Duration::from_millis(cli.tick_interval_ms));
        pacing.set_missed_tick_behavior(MissedTickBehavior::Delay);
        pacing
    });

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    while sim.tick() < config.num_ticks {
        tokio::select! {
            _ = &mut shutdown => {
                info!(tick = sim.tick(), "Stopping before the configured tick count");
                break;
            }
            _ = next_tick(&mut pacing) => {}
        }

        sim.advance();
        outputs.record(&sim.snapshot())?;
    }

    outputs.close()?;
    sim.finish();

    Ok(())
}

async fn next_tick(pacing: &mut Option<Interval>) {
    match pacing {
        Some(pacing) => {
            pacing.tick().await;
        }
        None => tokio::task::yield_now().await,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
