//! Daily hedging series CLI.
//!
//! Reads one `DF_<label>.csv` / `IV_<label>.csv` pair per valuation date,
//! runs the calibrate-then-price pipeline on every date and writes the
//! resulting swap/swaption NPV series as CSV (and optionally JSON lines).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use swaphedge_models::calibration::{CalibrationConfig, OutlierPolicy};
use swaphedge_models::instruments::swap::SwapDirection;
use swaphedge_pricing::hedging::{HedgingConfig, HedgingRecord, HedgingSeriesRunner};
use swaphedge_core::types::time::DayCount;

mod io;

/// Evaluate a swap/swaption hedge pair over a series of market snapshots.
#[derive(Debug, Parser)]
#[command(name = "hedging-series", version, about)]
struct Cli {
    /// Directory holding DF_<label>.csv and IV_<label>.csv files.
    #[arg(long)]
    data_dir: PathBuf,

    /// Snapshot labels to evaluate, in order (e.g. 2008-07-01).
    #[arg(long, required = true, num_args = 1.., value_delimiter = ',')]
    dates: Vec<String>,

    /// Output CSV path.
    #[arg(long, default_value = "hedging_series.csv")]
    output: PathBuf,

    /// Optional JSON-lines output path.
    #[arg(long)]
    json_output: Option<PathBuf>,

    /// Option maturity of the hedged swaption, in years.
    #[arg(long, default_value_t = 7.0)]
    maturity: f64,

    /// Tenor of the underlying swap, in years.
    #[arg(long, default_value_t = 6.0)]
    tenor: f64,

    /// Fixed strike rate; omitted means ATM on the first snapshot.
    #[arg(long)]
    strike: Option<f64>,

    /// Notional of the hedging swap.
    #[arg(long, default_value_t = 1000.0)]
    swap_notional: f64,

    /// Notional of the hedged swaption.
    #[arg(long, default_value_t = 1.0)]
    swaption_notional: f64,

    /// Disable the outlier-robust calibration refit.
    #[arg(long)]
    no_outlier_filter: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env().add_directive("hedging_series=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let snapshots = cli
        .dates
        .iter()
        .map(|label| io::load_snapshot(&cli.data_dir, label))
        .collect::<Result<Vec<_>>>()?;
    tracing::info!(n_snapshots = snapshots.len(), "market snapshots loaded");

    let config = HedgingConfig {
        maturity_years: cli.maturity,
        tenor_years: cli.tenor,
        strike: cli.strike,
        direction: SwapDirection::Payer,
        swap_notional: cli.swap_notional,
        swaption_notional: cli.swaption_notional,
        day_count: DayCount::Act365Fixed,
        calibration: CalibrationConfig::default(),
        outliers: (!cli.no_outlier_filter).then(OutlierPolicy::default),
    };

    let records = HedgingSeriesRunner::new(config)
        .run(&snapshots)
        .context("hedging series evaluation failed")?;

    write_csv(&cli.output, &records)
        .with_context(|| format!("cannot write {}", cli.output.display()))?;
    tracing::info!(path = %cli.output.display(), rows = records.len(), "series written");

    if let Some(path) = &cli.json_output {
        write_json_lines(path, &records)
            .with_context(|| format!("cannot write {}", path.display()))?;
    }

    Ok(())
}

fn write_csv(path: &PathBuf, records: &[HedgingRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["date", "swap_npv", "swaption_npv"])?;
    for record in records {
        writer.write_record([
            record.label.clone(),
            record.swap_npv.to_string(),
            record.swaption_npv.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json_lines(path: &PathBuf, records: &[HedgingRecord]) -> Result<()> {
    use std::io::Write;

    let mut file = std::fs::File::create(path)?;
    for record in records {
        let line = serde_json::to_string(record)?;
        writeln!(file, "{line}")?;
    }
    Ok(())
}
