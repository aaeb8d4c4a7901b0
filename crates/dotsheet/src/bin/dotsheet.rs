//! dotsheet CLI: run the sheet detector on one camera frame.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use dotsheet::detect::{detect_image, load_rgb};
use dotsheet::{
    CalibrationCache, DetectorConfig, FrameReport, GeometryMemory, PaperDetector,
    PrecomputedBlobs,
};
use log::LevelFilter;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "dotsheet")]
#[command(about = "Locate dot-coded sheets and the objects on them in one camera frame")]
#[command(version)]
struct Cli {
    /// Detector configuration (JSON). Missing fields take their defaults.
    #[arg(long)]
    config: PathBuf,

    /// Camera frame.
    #[arg(long)]
    image: PathBuf,

    /// Blobs found in the frame, a JSON list of `{"position": [x, y], "size": d}`.
    #[arg(long)]
    keypoints: PathBuf,

    /// Geometry memory carried between frames. Read if it exists, then
    /// overwritten with the updated memory.
    #[arg(long)]
    memory: Option<PathBuf>,

    /// Where to write the frame report (JSON). Printed to stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log level.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    /// Emit `tracing` spans as JSON lines instead of the plain logger.
    #[cfg(feature = "tracing")]
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn init_logging(cli: &Cli) -> CliResult<()> {
    #[cfg(feature = "tracing")]
    {
        dotsheet::core::init_tracing(cli.json_logs);
        log::set_max_level(cli.log_level.into());
        Ok(())
    }
    #[cfg(not(feature = "tracing"))]
    {
        dotsheet::core::init_with_level(cli.log_level.into())?;
        Ok(())
    }
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = DetectorConfig::load_json(&cli.config)?;
    let detector = PaperDetector::new(config)?;
    let img = load_rgb(&cli.image)?;
    let blobs: PrecomputedBlobs = serde_json::from_str(&fs::read_to_string(&cli.keypoints)?)?;

    let memory = match &cli.memory {
        Some(path) if path.exists() => GeometryMemory::load_json(path)?,
        _ => GeometryMemory::new(),
    };
    log::info!(
        "{} keypoints, {} remembered sheets",
        blobs.0.len(),
        memory.len()
    );

    let mut cache = CalibrationCache::new();
    let detection = detect_image(&detector, &img, &blobs, &[], &memory, &mut cache);

    if let Some(path) = &cli.memory {
        detection.memory.save_json(path)?;
    }

    let report = FrameReport::from_detection(&detection);
    match &cli.output {
        Some(path) => {
            report.write_json(path)?;
            println!(
                "{} pages, {} markers -> {}",
                report.pages.len(),
                report.markers.len(),
                path.display()
            );
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}
