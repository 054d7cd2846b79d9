use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tti_scan::image_loader::load_image;
use tti_scan::{
    build_default_calibration, AnalyzerConfig, Calibration, Metric, Region, RgbColor, TtiAnalyzer,
};

#[derive(Parser)]
#[command(
    name = "tti-scan",
    version,
    about = "Classify the freshness of a time-temperature indicator from a photo",
    after_help = "Examples:
  tti-scan analyze sensor.jpg                          Analyze the image center
  tti-scan analyze sensor.jpg --region 120,80,40,40    Analyze a specific region
  tti-scan sample reference.png --region 10,10,20,20   Pick a calibration color
  tti-scan classify '#8b5a2b'                          Classify a single color
  tti-scan calibration default                         Activate the default calibration"
)]
struct Cli {
    /// Analyzer configuration file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Calibration file, overrides the configuration
    #[arg(long, global = true, value_name = "FILE")]
    calibration: Option<PathBuf>,

    /// Distance metric used to pick the status
    #[arg(long, global = true, value_name = "METRIC")]
    metric: Option<Metric>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a sensor photo
    Analyze {
        image: PathBuf,

        /// Region as X,Y,WIDTH,HEIGHT (default: centered half of the image)
        #[arg(long, allow_hyphen_values = true)]
        region: Option<Region>,
    },

    /// Print the mean color of a region
    Sample {
        image: PathBuf,

        #[arg(long, allow_hyphen_values = true)]
        region: Option<Region>,
    },

    /// Classify a hex color against the active calibration
    Classify { color: RgbColor },

    /// Inspect or replace the active calibration
    Calibration {
        #[command(subcommand)]
        action: CalibrationAction,
    },
}

#[derive(Subcommand)]
enum CalibrationAction {
    /// Show the active calibration
    Status,

    /// Replace the active calibration with the built-in default
    Default,

    /// Replace the active calibration with a JSON file
    Import { file: PathBuf },
}

#[derive(Serialize)]
struct CalibrationStatus {
    has_calibration: bool,
    path: PathBuf,
    calibration: Option<Calibration>,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_config(cli: &Cli) -> anyhow::Result<AnalyzerConfig> {
    let mut config = match &cli.config {
        Some(path) => AnalyzerConfig::from_json_file(path)?,
        None => AnalyzerConfig::default(),
    };
    if let Some(path) = &cli.calibration {
        config.calibration_path = path.clone();
    }
    if let Some(metric) = cli.metric {
        config.metric = metric;
    }
    Ok(config)
}

fn import_calibration(analyzer: &TtiAnalyzer, file: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let calibration = Calibration::from_json_str(&content)?;
    analyzer.save_calibration(calibration)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tti_scan=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let config = build_config(&cli)?;
    let analyzer = TtiAnalyzer::new(&config);

    match cli.command {
        Commands::Analyze { image, region } => {
            let report = analyzer.analyze_image_report(&image, region);
            print_json(&report)?;
            if report.is_error() {
                std::process::exit(1);
            }
        }
        Commands::Sample { image, region } => {
            let decoded = load_image(&image)?;
            print_json(&analyzer.extract_color(&decoded, region))?;
        }
        Commands::Classify { color } => {
            print_json(&analyzer.classify_color(color)?)?;
        }
        Commands::Calibration { action } => match action {
            CalibrationAction::Status => print_json(&CalibrationStatus {
                has_calibration: analyzer.has_calibration(),
                path: config.calibration_path.clone(),
                calibration: analyzer.calibration_store().active(),
            })?,
            CalibrationAction::Default => {
                analyzer.save_calibration(build_default_calibration())?;
                eprintln!("Default calibration applied");
            }
            CalibrationAction::Import { file } => {
                import_calibration(&analyzer, &file)?;
                eprintln!("Calibration saved to {}", config.calibration_path.display());
            }
        },
    }

    Ok(())
}
