//! Cruise tile generator.
//!
//! Renders daily ocean products (sea surface height, temperature,
//! chlorophyll) and bathymetry into slippy map tiles.

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use clap::{Parser, Subcommand};
use seatiles::layers::{find_date_ranges, update_date_ranges, write_default_layer_config, LAYER_CONFIG_FILE};
use seatiles::{
    backfill, ensure_not_future, last_days, process_all, process_grid_file, process_product, today_utc, Product,
    ProductOutcome, SeatilesConfig,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "seatiles")]
#[command(about = "Slippy tile generator for cruise support ocean products")]
struct Args {
    /// Configuration file path (built-in defaults when omitted)
    #[arg(short, long, env = "SEATILES_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Tile one product for one day
    Render {
        /// Product id (ssh, ostia/sst, globcolour, gebco)
        #[arg(short, long)]
        product: Product,

        /// Day to render (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,

        /// Re-render even if tiles for the day exist
        #[arg(long)]
        force: bool,

        /// Grid file to use instead of the one in the data directory
        #[arg(long)]
        grid: Option<PathBuf>,
    },

    /// Tile every daily product for one day
    All {
        #[arg(short, long)]
        date: NaiveDate,

        #[arg(long)]
        force: bool,
    },

    /// Daily refresh: the day without force, the day before with force,
    /// then the layer date ranges
    Update {
        /// Day to refresh (default: today, UTC)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Layer configuration to keep in step
        #[arg(long, default_value = LAYER_CONFIG_FILE)]
        file: PathBuf,
    },

    /// Tile every daily product for the last N days through today, then
    /// refresh the layer date ranges
    Backfill {
        /// Days before today to include
        #[arg(long, default_value_t = 7)]
        days: u64,

        #[arg(long)]
        force: bool,

        #[arg(long, default_value = LAYER_CONFIG_FILE)]
        file: PathBuf,
    },

    /// Refresh the date ranges in the viewer's layer configuration
    Layers {
        #[arg(long, default_value = LAYER_CONFIG_FILE)]
        file: PathBuf,

        /// Write a fresh default configuration with this tile base URL first
        #[arg(long)]
        init: Option<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level, args.log_json)?;

    let config = match &args.config {
        Some(path) => SeatilesConfig::load(path)?,
        None => SeatilesConfig::from_env()?,
    };
    info!(
        cruise = %config.cruise_name,
        tile_dir = %config.tile_dir.display(),
        data_dir = %config.data_dir.display(),
        zooms = ?config.zoom_levels,
        workers = config.workers,
        "Loaded configuration"
    );

    match args.command {
        Command::Render {
            product,
            date,
            force,
            grid,
        } => {
            ensure_not_future(date, today_utc())?;
            let outcome = match grid {
                Some(path) => process_grid_file(&config, product, date, force, &path, std::thread::sleep)?,
                None => process_product(&config, product, date, force)?,
            };
            report(product, &outcome);
        }
        Command::All { date, force } => {
            ensure_not_future(date, today_utc())?;
            run_day(&config, date, force);
        }
        Command::Update { date, file } => {
            let today = date.unwrap_or_else(today_utc);
            ensure_not_future(today, today_utc())?;
            run_day(&config, today, false);
            if let Some(yesterday) = today.checked_sub_days(Days::new(1)) {
                run_day(&config, yesterday, true);
            }
            refresh_layers(&config, &file)?;
        }
        Command::Backfill { days, force, file } => {
            let dates = last_days(today_utc(), days);
            if let (Some(&from), Some(&to)) = (dates.first(), dates.last()) {
                for (date, report) in backfill(&config, from, to, force)? {
                    info!(date = %date, "Day complete");
                    report_day(report);
                }
            }
            refresh_layers(&config, &file)?;
        }
        Command::Layers { file, init } => {
            if let Some(base_url) = init {
                let dir = file.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
                let written = write_default_layer_config(dir, &base_url)?;
                if written != file {
                    std::fs::rename(&written, &file)
                        .with_context(|| format!("Failed to move layer config to {:?}", file))?;
                }
            }
            refresh_layers(&config, &file)?;
        }
    }

    Ok(())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn run_day(config: &SeatilesConfig, date: NaiveDate, force: bool) {
    report_day(process_all(config, date, force));
}

fn report_day(day_report: seatiles::DayReport) {
    for (product, outcome) in day_report {
        if let Ok(outcome) = outcome {
            report(product, &outcome);
        }
    }
}

fn report(product: Product, outcome: &ProductOutcome) {
    match outcome {
        ProductOutcome::Rendered(summary) => info!(
            product = %product,
            tiles = summary.file_count(),
            failed = summary.failure_count(),
            "Rendered"
        ),
        ProductOutcome::AlreadyExists => info!(product = %product, "Already rendered"),
        ProductOutcome::Skipped(reason) => warn!(product = %product, reason = %reason, "Skipped"),
    }
}

fn refresh_layers(config: &SeatilesConfig, file: &Path) -> Result<()> {
    if !file.is_file() {
        warn!(path = %file.display(), "No layer configuration, not updating date ranges");
        return Ok(());
    }
    let ranges = find_date_ranges(&config.tile_dir)?;
    update_date_ranges(file, &ranges, None)?;
    Ok(())
}
