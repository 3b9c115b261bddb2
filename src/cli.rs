//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{CsvAdapter, read_candle_file, write_signals};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::SignalError;
use crate::domain::policy::Action;
use crate::domain::presets::Preset;
use crate::domain::series::CandleTable;
use crate::domain::strategy::Strategy;
use crate::ports::data_port::CandlePort;

#[derive(Parser, Debug)]
#[command(name = "anchorsignal", about = "Cross-asset anchor signal generator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate signals for every aligned candle
    Run {
        /// Preset name or policy file
        #[arg(short, long)]
        strategy: String,
        /// Directory of <SYMBOL>_<TIMEFRAME>.csv files
        #[arg(long, conflicts_with_all = ["target", "anchors"])]
        data_dir: Option<PathBuf>,
        /// Target candle file
        #[arg(long, requires = "anchors")]
        target: Option<PathBuf>,
        /// Anchor candle file with one close column per anchor
        #[arg(long, requires = "target")]
        anchors: Option<PathBuf>,
        /// Signal CSV destination (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a policy file
    Validate {
        #[arg(short, long)]
        strategy: PathBuf,
    },
    /// Show the candles a strategy needs
    Metadata {
        #[arg(short, long)]
        strategy: String,
    },
    /// List built-in presets
    Presets,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Run {
            strategy,
            data_dir,
            target,
            anchors,
            output,
        } => run_signals(
            &strategy,
            data_dir.as_deref(),
            target.as_deref().zip(anchors.as_deref()),
            output.as_deref(),
        ),
        Command::Validate { strategy } => run_validate(&strategy),
        Command::Metadata { strategy } => run_metadata(&strategy),
        Command::Presets => {
            run_presets();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            (&e).into()
        }
    }
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SignalError> {
    FileConfigAdapter::from_file(path).map_err(|e| SignalError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// A preset name, or else the path of a policy file.
pub fn resolve_strategy(spec: &str) -> Result<Strategy, SignalError> {
    if let Ok(preset) = spec.parse::<Preset>() {
        tracing::info!(preset = preset.name(), "using preset");
        return Ok(preset.strategy());
    }

    let path = Path::new(spec);
    if !path.is_file() {
        return Err(SignalError::ConfigParse {
            file: spec.to_string(),
            reason: format!(
                "not a preset ({}) or a readable policy file",
                Preset::ALL.map(|p| p.name()).join(", ")
            ),
        });
    }
    tracing::info!("loading policy from {}", path.display());
    Strategy::from_config(&load_config(path)?)
}

fn load_candles(
    strategy: &Strategy,
    data_dir: Option<&Path>,
    files: Option<(&Path, &Path)>,
) -> Result<(CandleTable, CandleTable), SignalError> {
    match (data_dir, files) {
        (Some(dir), _) => {
            let port = CsvAdapter::new(dir.to_path_buf());
            let meta = strategy.metadata();
            Ok((
                port.target_candles(&meta.target)?,
                port.anchor_candles(&meta.anchors)?,
            ))
        }
        (None, Some((target, anchors))) => {
            Ok((read_candle_file(target)?, read_candle_file(anchors)?))
        }
        (None, None) => Err(SignalError::ConfigMissing {
            section: "run".into(),
            key: "--data-dir or --target/--anchors".into(),
        }),
    }
}

fn run_signals(
    strategy_spec: &str,
    data_dir: Option<&Path>,
    files: Option<(&Path, &Path)>,
    output: Option<&Path>,
) -> Result<(), SignalError> {
    let strategy = resolve_strategy(strategy_spec)?;
    let (target, anchors) = load_candles(&strategy, data_dir, files)?;
    let signals = strategy.generate_signals(&target, &anchors)?;

    match output {
        Some(path) => {
            write_signals(&signals, BufWriter::new(File::create(path)?))?;
            tracing::info!("signals written to {}", path.display());
        }
        None => write_signals(&signals, io::stdout().lock())?,
    }

    tracing::info!(
        buy = signals.count(Action::Buy),
        sell = signals.count(Action::Sell),
        hold = signals.count(Action::Hold),
        "done"
    );
    Ok(())
}

fn run_validate(path: &Path) -> Result<(), SignalError> {
    tracing::info!("validating policy {}", path.display());
    let strategy = Strategy::from_config(&load_config(path)?)?;
    let policy = &strategy.policy;

    println!("{}", strategy.name);
    if !strategy.description.is_empty() {
        println!("  {}", strategy.description);
    }
    println!("\nGuards (first match wins):");
    for guard in &policy.guards {
        println!("  {} -> {}", guard.name, guard.action);
        println!("    {}", guard.rule);
    }
    println!("  otherwise -> {}", policy.default_action);

    println!("\nFeatures:");
    for feature in policy.feature_requests() {
        println!("  {}", feature);
    }
    println!("\nWarm-up rows: {}", policy.required_history());
    println!("\nPolicy is valid.");
    Ok(())
}

fn run_metadata(spec: &str) -> Result<(), SignalError> {
    let strategy = resolve_strategy(spec)?;
    let meta = strategy.metadata();
    println!("target: {}", meta.target);
    println!(
        "anchors: {}",
        meta.anchors
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}

fn run_presets() {
    for preset in Preset::ALL {
        println!("{:<20} {}", preset.name(), preset.description());
    }
}
