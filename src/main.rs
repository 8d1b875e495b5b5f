use std::io;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{Duration, Local, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trail_crowd_signal::alert_log::{AlertFilter, AlertLog};
use trail_crowd_signal::alerts::generate_alerts_with;
use trail_crowd_signal::forecast::{generate_forecast, DEFAULT_HORIZON_HOURS};
use trail_crowd_signal::report;
use trail_crowd_signal::signal::generate_snapshot;
use trail_crowd_signal::summary::summarize_snapshot;
use trail_crowd_signal::{Catalog, SignalConfig};

#[derive(Parser)]
#[command(name = "crowd-signal")]
#[command(about = "Synthetic trail congestion signals, forecasts and alerts", long_about = None)]
struct Cli {
    /// Catalog JSON, as printed by the `catalog` command
    #[arg(long, global = true, env = "CROWD_SIGNAL_CONFIG")]
    config: Option<PathBuf>,
    /// Seed for reproducible output
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Local wall-clock time to evaluate, e.g. 2026-10-18T11:00
    #[arg(long, global = true, value_parser = parse_timestamp)]
    at: Option<NaiveDateTime>,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Current occupancy per trail
    Snapshot,
    /// Hourly occupancy projection
    Forecast {
        #[arg(long, default_value_t = DEFAULT_HORIZON_HOURS)]
        hours: usize,
        /// Also write the projection as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Poll the generator and list congestion alerts
    Alerts {
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
        /// Number of one-minute polls to merge into the alert log
        #[arg(long, default_value_t = 1)]
        polls: u32,
        /// Alert ids to mark resolved after polling
        #[arg(long)]
        resolve: Vec<String>,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Print the active catalog as JSON
    Catalog,
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterArg {
    All,
    Danger,
    Warning,
    Resolved,
}

impl From<FilterArg> for AlertFilter {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::All => AlertFilter::All,
            FilterArg::Danger => AlertFilter::Danger,
            FilterArg::Warning => AlertFilter::Warning,
            FilterArg::Resolved => AlertFilter::Resolved,
        }
    }
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, String> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| format!("expected YYYY-MM-DDTHH:MM[:SS], got {value}"))
}

fn init_tracing() {
    // RUST_LOG controls verbosity, e.g. RUST_LOG=trail_crowd_signal=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let catalog = match &cli.config {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("failed to load catalog from {}", path.display()))?,
        None => Catalog::default(),
    };
    let at = cli.at.unwrap_or_else(|| Local::now().naive_local());
    let mut rng = match cli.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    info!(%at, seed = ?cli.seed, "Starting crowd-signal");

    match cli.command {
        Commands::Snapshot => {
            let snapshot = generate_snapshot(&catalog, at, &mut rng);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
                return Ok(());
            }

            let thresholds = catalog.thresholds();
            println!("Trail occupancy at {}:", at.format("%Y-%m-%d %H:%M"));
            for trail in &snapshot {
                println!(
                    "- {} {}/{} ({}%, {})",
                    trail.name,
                    trail.current_count,
                    trail.capacity,
                    trail.occupancy_percent(),
                    thresholds.level(trail.current_count, trail.capacity).label()
                );
            }
            let summary = summarize_snapshot(&snapshot, thresholds);
            println!("Total visitors: {}", summary.total_visitors);
            if let Some(id) = summary.quietest_trail {
                println!("Least crowded: {id}");
            }
        }
        Commands::Forecast { hours, csv } => {
            let points = generate_forecast(&catalog, at, hours, &mut rng);

            if let Some(path) = &csv {
                let file = std::fs::File::create(path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                report::write_forecast_csv(file, &points)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&points)?);
            } else {
                for point in &points {
                    println!("+{:>2}h {} total {}", point.hour, point.time, point.total);
                }
            }

            if let Some(path) = csv {
                eprintln!("Forecast written to {}.", path.display());
            }
        }
        Commands::Alerts {
            filter,
            polls,
            resolve,
        } => {
            let mut log = AlertLog::new();
            for poll in 0..polls.max(1) {
                let poll_at = at + Duration::minutes(i64::from(poll));
                let snapshot = generate_snapshot(&catalog, poll_at, &mut rng);
                let alerts = generate_alerts_with(catalog.thresholds(), &snapshot, poll_at);
                log.ingest(&alerts, poll_at);
            }
            for id in &resolve {
                log.resolve(id)?;
            }

            let entries = log.filtered(filter.into());
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }

            let counts = log.counts();
            println!(
                "{} active ({} danger, {} warning), {} cleared, {} resolved",
                counts.active, counts.danger, counts.warning, counts.cleared, counts.resolved
            );
            if entries.is_empty() {
                println!("No alerts.");
            }
            for entry in entries {
                println!(
                    "- [{:?}] {} (seen {}x, last {})",
                    entry.alert.kind,
                    entry.alert.message,
                    entry.occurrences,
                    entry.last_seen.format("%H:%M")
                );
            }
        }
        Commands::Report { out } => {
            let snapshot = generate_snapshot(&catalog, at, &mut rng);
            let alerts = generate_alerts_with(catalog.thresholds(), &snapshot, at);
            let forecast = generate_forecast(&catalog, at, DEFAULT_HORIZON_HOURS, &mut rng);
            let report = report::build_report(&catalog, at, &snapshot, &alerts, &forecast);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Catalog => {
            let config: &SignalConfig = catalog.config();
            println!("{}", serde_json::to_string_pretty(config)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_minute_and_second_timestamps() {
        let minute = parse_timestamp("2026-10-18T11:30").unwrap();
        assert_eq!((minute.hour(), minute.minute()), (11, 30));
        let second = parse_timestamp("2026-10-18 07:05:09").unwrap();
        assert_eq!(second.second(), 9);
        assert!(parse_timestamp("tomorrow").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
