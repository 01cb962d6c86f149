//! Bloom Sensor Agent CLI
//!
//! Desk presence sensor driving a wilting flower display.

use anyhow::{bail, Context};
use bloom_sensor_agent::{
    agent::{Agent, RunOptions, StopReason},
    catalog::AssetCatalog,
    config::{Config, Preset},
    core::SelectionMode,
    render::LogRenderer,
    session::SessionSummary,
    source::{
        synthetic, InteractiveSource, LidarSource, RangeSource, ReplayDevice, SourceKind,
        SyntheticSource,
    },
    ABOUT, VERSION,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bloom-sensor")]
#[command(author = "Bloom")]
#[command(version = VERSION)]
#[command(about = "Desk presence sensor driving a wilting flower display", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sensing loop
    Start {
        /// Input source (lidar, synthetic, pattern or interactive)
        #[arg(long, default_value = "synthetic")]
        source: SourceKind,

        /// Parameter preset (defaults to the source's own preset)
        #[arg(long)]
        preset: Option<Preset>,

        /// Recorded scan file for the lidar source (JSON Lines)
        #[arg(long)]
        replay: Option<PathBuf>,

        /// Directory holding the flower images
        #[arg(long)]
        assets: Option<PathBuf>,

        /// Asset selection mode (vitality or binary)
        #[arg(long)]
        mode: Option<SelectionMode>,

        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,

        /// Run ticks back to back without pausing
        #[arg(long)]
        fast: bool,

        /// Write the presence time series to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Show configuration, optionally writing it back
    Config {
        /// Write the configuration file (defaults if none exists yet)
        #[arg(long)]
        init: bool,

        /// Persist the directory holding the flower images
        #[arg(long, value_name = "DIR")]
        set_assets: Option<PathBuf>,
    },

    /// List parameter presets
    Presets,

    /// List the assets found in a directory
    Catalog {
        /// Directory to scan (defaults to the configured asset directory)
        dir: Option<PathBuf>,
    },

    /// Show the last session summary
    Status,

    /// Explain what the sensor does
    About,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            source,
            preset,
            replay,
            assets,
            mode,
            ticks,
            fast,
            csv,
        } => cmd_start(StartArgs {
            source,
            preset,
            replay,
            assets,
            mode,
            ticks,
            fast,
            csv,
        }),
        Commands::Config { init, set_assets } => cmd_config(init, set_assets),
        Commands::Presets => {
            cmd_presets();
            Ok(())
        }
        Commands::Catalog { dir } => cmd_catalog(dir),
        Commands::Status => cmd_status(),
        Commands::About => {
            println!("{ABOUT}");
            Ok(())
        }
    }
}

struct StartArgs {
    source: SourceKind,
    preset: Option<Preset>,
    replay: Option<PathBuf>,
    assets: Option<PathBuf>,
    mode: Option<SelectionMode>,
    ticks: Option<u64>,
    fast: bool,
    csv: Option<PathBuf>,
}

fn cmd_start(args: StartArgs) -> anyhow::Result<()> {
    println!("Bloom Sensor Agent v{VERSION}");
    println!();

    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config ({e}), using defaults");
        Config::default()
    });
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    let preset = args
        .preset
        .unwrap_or_else(|| Preset::for_source(args.source));
    preset.apply(&mut config);
    if let Some(mode) = args.mode {
        config.pipeline.selection = mode;
    }

    let catalog = load_catalog(args.assets.as_deref(), &config)?;
    let source = build_source(args.source, args.replay.as_deref(), &config)?;

    println!("Starting...");
    println!("  Source: {}", args.source);
    println!("  Preset: {preset} ({})", preset.describe());
    println!("  Selection: {}", config.pipeline.selection);
    println!("  Assets: {}", catalog.len());
    if args.source == SourceKind::Interactive {
        println!();
        println!("Steer with left/right/up/down (or a/d/w/s), stop with x, quit with q.");
        println!("Each command must be followed by Enter.");
    }
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let stop = Arc::new(AtomicBool::new(false));
    ctrlc_handler(stop.clone())?;

    let export_path = config.export_path.clone();
    let options = RunOptions {
        max_ticks: args.ticks,
        fast: args.fast,
    };
    let mut agent = Agent::new(config, source, LogRenderer::new(), catalog)?;
    let outcome = agent.run(&stop, &options)?;

    println!();
    match outcome.reason {
        StopReason::Requested => println!("Stopped."),
        reason => println!("Stopped: {reason}."),
    }

    if let Some(path) = &args.csv {
        outcome
            .session
            .write_csv(path)
            .with_context(|| format!("writing presence log to {}", path.display()))?;
        println!("Wrote {} rows to {:?}", outcome.session.rows().len(), path);
    }

    let summary = outcome.session.summary();
    match summary.save(&export_path) {
        Ok(path) => println!("Saved session summary to {path:?}"),
        Err(e) => eprintln!("Warning: Could not save session summary: {e}"),
    }

    println!();
    println!("{}", summary.display());
    Ok(())
}

fn build_source(
    kind: SourceKind,
    replay: Option<&Path>,
    config: &Config,
) -> anyhow::Result<Box<dyn RangeSource>> {
    let source: Box<dyn RangeSource> = match kind {
        SourceKind::Lidar => {
            let Some(path) = replay else {
                bail!("the lidar source needs a recording, pass --replay <FILE>");
            };
            Box::new(LidarSource::new(ReplayDevice::open(path), config.lidar))
        }
        SourceKind::Synthetic => Box::new(SyntheticSource::waveform(
            synthetic::WAVEFORM_LENGTH,
            synthetic::WAVEFORM_FREQUENCY,
            config.synthetic,
        )),
        SourceKind::Pattern => Box::new(SyntheticSource::from_presence(
            "pattern",
            &synthetic::default_pattern(),
            config.synthetic,
        )),
        SourceKind::Interactive => Box::new(InteractiveSource::from_stdin(config.interactive)),
    };
    Ok(source)
}

fn load_catalog(assets: Option<&Path>, config: &Config) -> anyhow::Result<AssetCatalog> {
    let Some(dir) = assets.or(config.asset_dir.as_deref()) else {
        bail!("no asset directory, pass --assets <DIR> or set asset_dir in the config file");
    };
    let catalog = AssetCatalog::discover(dir, &config.asset_pattern)?;
    Ok(catalog)
}

fn cmd_config(init: bool, set_assets: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let changed = set_assets.is_some();
    if let Some(dir) = set_assets {
        let catalog = AssetCatalog::discover(&dir, &config.asset_pattern)?;
        println!("Found {} asset(s) in {dir:?}", catalog.len());
        config.asset_dir = Some(dir);
    }
    if init || changed {
        let path = config.save()?;
        println!("Saved configuration to {path:?}");
        println!();
    }

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);

    if let Err(e) = config.validate() {
        println!();
        println!("Warning: {e}");
    }
    Ok(())
}

fn cmd_presets() {
    println!("Presets");
    println!("=======");
    println!();
    for preset in Preset::ALL {
        println!("  {:<12} {}", preset.as_str(), preset.describe());
    }
}

fn cmd_catalog(dir: Option<PathBuf>) -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_default();
    let catalog = load_catalog(dir.as_deref(), &config)?;

    println!("Found {} asset(s) matching {}", catalog.len(), config.asset_pattern);
    for (index, asset) in catalog.iter().enumerate() {
        println!("  [{index:>3}] {}", asset.display());
    }
    Ok(())
}

fn cmd_status() -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("Bloom Sensor Agent Status");
    println!("=========================");
    println!();
    println!("Configuration:");
    println!("  Smoothing window: {}", config.pipeline.smoothing_window);
    println!(
        "  Detection band: {}-{} cm (hunched below {} cm)",
        config.pipeline.classifier.near_cm,
        config.pipeline.classifier.far_cm,
        config.pipeline.classifier.hunched_cm
    );
    println!(
        "  Vitality: decay {}/s, recover {}/s",
        config.pipeline.vitality.decay_rate, config.pipeline.vitality.recover_rate
    );
    println!("  Selection: {}", config.pipeline.selection);
    match &config.asset_dir {
        Some(dir) => println!("  Asset directory: {dir:?}"),
        None => println!("  Asset directory: not set"),
    }
    println!();

    match SessionSummary::load_latest(&config.export_path)? {
        Some(summary) => {
            println!("Last session ({}):", summary.started_at.format("%Y-%m-%d %H:%M:%S"));
            println!("{}", summary.display());
        }
        None => println!("No previous session data found."),
    }
    Ok(())
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(stop: Arc<AtomicBool>) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        stop.store(true, Ordering::SeqCst);
    })
    .context("setting Ctrl+C handler")
}
