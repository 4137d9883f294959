//! Snapshot loading from CSV market data files.
//!
//! Two files per valuation date:
//!
//! - `DF_<label>.csv`: `date,discount` rows for the curve pillars after
//!   the valuation date. The unit factor at the valuation date itself is
//!   implied and synthesised here.
//! - `IV_<label>.csv`: a 10x10 grid of ATM swaption volatilities in
//!   percent, rows are option maturities 1..=10y, columns tenors 1..=10y.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use swaphedge_core::types::time::Date;
use swaphedge_models::calibration::VolSurface;
use swaphedge_pricing::hedging::MarketSnapshot;

#[derive(Debug, Deserialize)]
struct DiscountRow {
    date: Date,
    discount: f64,
}

/// Loads the snapshot for one labelled valuation date.
pub fn load_snapshot(data_dir: &Path, label: &str) -> Result<MarketSnapshot> {
    let valuation = parse_label(label)?;

    let df_path = data_dir.join(format!("DF_{label}.csv"));
    let (mut dates, mut factors) =
        read_discount_factors(&df_path).with_context(|| format!("reading {}", df_path.display()))?;

    // The valuation-date pillar is implicit in the data files.
    if dates.first() != Some(&valuation) {
        dates.insert(0, valuation);
        factors.insert(0, 1.0);
    }

    let iv_path = data_dir.join(format!("IV_{label}.csv"));
    let surface =
        read_vol_surface(&iv_path).with_context(|| format!("reading {}", iv_path.display()))?;

    Ok(MarketSnapshot {
        label: label.to_string(),
        dates,
        discount_factors: factors,
        surface,
    })
}

/// Accepts labels as `YYYY-MM-DD` or the compact `YYYYMMDD` the legacy
/// data files use.
fn parse_label(label: &str) -> Result<Date> {
    if let Ok(date) = label.parse::<Date>() {
        return Ok(date);
    }
    if label.len() == 8 && label.chars().all(|c| c.is_ascii_digit()) {
        let dashed = format!("{}-{}-{}", &label[0..4], &label[4..6], &label[6..8]);
        return dashed
            .parse::<Date>()
            .with_context(|| format!("invalid snapshot label {label}"));
    }
    bail!("invalid snapshot label {label}: expected YYYY-MM-DD or YYYYMMDD")
}

fn read_discount_factors(path: &Path) -> Result<(Vec<Date>, Vec<f64>)> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut dates = Vec::new();
    let mut factors = Vec::new();
    for row in reader.deserialize() {
        let row: DiscountRow = row?;
        dates.push(row.date);
        factors.push(row.discount);
    }
    if dates.is_empty() {
        bail!("no discount factor rows");
    }
    Ok((dates, factors))
}

fn read_vol_surface(path: &Path) -> Result<VolSurface> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut vols = Vec::new();
    let mut n_cols = None;
    for row in reader.records() {
        let row = row?;
        let values: Result<Vec<f64>, _> = row.iter().map(|cell| cell.trim().parse()).collect();
        let Ok(values) = values else {
            // Header or annotation row
            continue;
        };
        if values.is_empty() {
            continue;
        }
        match n_cols {
            None => n_cols = Some(values.len()),
            Some(n) if n != values.len() => {
                bail!("ragged volatility grid: {} columns then {}", n, values.len())
            }
            Some(_) => {}
        }
        vols.extend(values);
    }

    let n_cols = n_cols.context("no volatility rows")?;
    let n_rows = vols.len() / n_cols;
    let maturities: Vec<f64> = (1..=n_rows).map(|i| i as f64).collect();
    let tenors: Vec<f64> = (1..=n_cols).map(|j| j as f64).collect();
    VolSurface::from_percent(maturities, tenors, vols)
        .map_err(|err| anyhow::anyhow!("invalid volatility surface: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_label_forms() {
        assert_eq!(
            parse_label("2008-07-01").unwrap(),
            parse_label("20080701").unwrap()
        );
        assert!(parse_label("July 1 2008").is_err());
    }

    #[test]
    fn test_load_snapshot_synthesises_valuation_pillar() {
        let dir = tempfile::tempdir().unwrap();

        let mut df = std::fs::File::create(dir.path().join("DF_2008-07-01.csv")).unwrap();
        writeln!(df, "date,discount").unwrap();
        writeln!(df, "2008-10-01,0.999372").unwrap();
        writeln!(df, "2009-07-01,0.98572").unwrap();

        let mut iv = std::fs::File::create(dir.path().join("IV_2008-07-01.csv")).unwrap();
        writeln!(iv, "20.0,19.0").unwrap();
        writeln!(iv, "18.0,17.0").unwrap();

        let snapshot = load_snapshot(dir.path(), "2008-07-01").unwrap();
        assert_eq!(snapshot.dates.len(), 3);
        assert_eq!(snapshot.discount_factors[0], 1.0);
        assert_eq!(snapshot.surface.vol(0, 0), 0.20);
        assert_eq!(snapshot.surface.maturities().len(), 2);
    }

    #[test]
    fn test_ragged_grid_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut iv = std::fs::File::create(dir.path().join("iv.csv")).unwrap();
        writeln!(iv, "20.0,19.0").unwrap();
        writeln!(iv, "18.0").unwrap();
        assert!(read_vol_surface(&dir.path().join("iv.csv")).is_err());
    }
}
