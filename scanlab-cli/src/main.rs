//! Screener CLI — scan, ledger, and config commands.
//!
//! Commands:
//! - `scan` — run one screening pass over a snapshot CSV and emit the cohort
//! - `advance` — mature held positions against a date
//! - `due` — list positions awaiting an exit fill
//! - `close` — close a due position at a fill price
//! - `validate-config` — load a TOML config and report the first error

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use scanlab_core::config::ScanConfig;
use scanlab_core::domain::{CohortEntry, RawSnapshot};
use scanlab_core::ledger::PositionLedger;
use scanlab_core::pipeline::{apply_cohort, run_scan, RunReport};
use scanlab_core::rng::ControlRng;

#[derive(Parser)]
#[command(name = "scanlab", about = "scanlab CLI — daily equity screening pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one screening pass over a snapshot CSV and emit the cohort.
    Scan {
        /// Path to a TOML scan config. Defaults to the built-in v4 config.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Snapshot CSV (one row per candidate, headers matching the
        /// snapshot field names).
        #[arg(long)]
        snapshots: PathBuf,

        /// Run date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Master seed for the control draw. Omit for a fresh draw.
        #[arg(long)]
        seed: Option<u64>,

        /// Ledger JSON to update in place. Created if missing.
        #[arg(long)]
        ledger: Option<PathBuf>,

        /// Output directory for report JSON and cohort CSV.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Mature held positions against a date.
    Advance {
        /// Ledger JSON to update in place.
        #[arg(long)]
        ledger: PathBuf,

        /// Date to advance to (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Holding period in calendar days.
        #[arg(long, default_value_t = 7)]
        holding_days: i64,
    },
    /// List positions awaiting an exit fill.
    Due {
        /// Ledger JSON to read.
        #[arg(long)]
        ledger: PathBuf,
    },
    /// Close a due position at a fill price.
    Close {
        /// Ledger JSON to update in place.
        #[arg(long)]
        ledger: PathBuf,

        /// Ticker to close.
        #[arg(long)]
        ticker: String,

        /// Exit fill price.
        #[arg(long)]
        price: f64,

        /// Exit date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },
    /// Load a TOML config and report the first error.
    ValidateConfig {
        /// Path to a TOML scan config.
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            config,
            snapshots,
            date,
            seed,
            ledger,
            output_dir,
        } => run_scan_cmd(config, snapshots, date, seed, ledger, output_dir),
        Commands::Advance {
            ledger,
            date,
            holding_days,
        } => run_advance(&ledger, date, holding_days),
        Commands::Due { ledger } => run_due(&ledger),
        Commands::Close {
            ledger,
            ticker,
            price,
            date,
        } => run_close(&ledger, &ticker, price, date),
        Commands::ValidateConfig { config } => run_validate_config(&config),
    }
}

fn parse_date(date: Option<String>) -> Result<NaiveDate> {
    date.as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("dates must be YYYY-MM-DD")
        .map(|d| d.unwrap_or_else(|| chrono::Local::now().date_naive()))
}

fn run_scan_cmd(
    config_path: Option<PathBuf>,
    snapshots: PathBuf,
    date: Option<String>,
    seed: Option<u64>,
    ledger_path: Option<PathBuf>,
    output_dir: PathBuf,
) -> Result<()> {
    let config = match config_path {
        Some(path) => ScanConfig::from_file(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ScanConfig::default(),
    };
    let run_date = parse_date(date)?;
    let rows = read_snapshots(&snapshots)?;
    if rows.is_empty() {
        bail!("no snapshot rows in {}", snapshots.display());
    }

    let control_rng = match seed {
        Some(s) => ControlRng::Seeded(s),
        None => ControlRng::Entropy,
    };
    let report = run_scan(rows, &config, run_date, control_rng)?;
    print_summary(&report, &config);

    if let Some(path) = ledger_path {
        let mut ledger = load_ledger(&path)?;
        let delta = apply_cohort(&report.cohort, &mut ledger, config.holding_period_days);
        save_ledger(&path, &ledger)?;
        println!(
            "Ledger: {} opened, {} newly due, {} conflicts",
            delta.opened.len(),
            delta.newly_due.len(),
            delta.conflicts.len()
        );
        for conflict in &delta.conflicts {
            eprintln!("  conflict: {} ({})", conflict.ticker, conflict.reason);
        }
    }

    save_artifacts(&report, &config, &output_dir)?;
    Ok(())
}

fn read_snapshots(path: &Path) -> Result<Vec<RawSnapshot>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening snapshot CSV {}", path.display()))?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: RawSnapshot = record.context("malformed snapshot row")?;
        rows.push(row);
    }
    Ok(rows)
}

fn print_summary(report: &RunReport, config: &ScanConfig) {
    println!("Run {} ({})", report.run_id.0, report.run_date);
    println!(
        "  {} candidates scored, {} excluded",
        report.candidates.len(),
        report.exclusions.len()
    );
    println!(
        "  Primary cohort ({}, ranked by {}):",
        report.cohort.primary.len(),
        config.selection
    );
    for entry in &report.cohort.primary {
        let total = entry
            .breakdowns
            .iter()
            .find(|b| b.scheme == config.selection)
            .map(|b| b.total)
            .unwrap_or(0.0);
        println!("    {:6} {:>8.2} @ {:.2}", entry.ticker, total, entry.entry_price);
    }
    println!("  Control cohort ({}):", report.cohort.control.len());
    for entry in &report.cohort.control {
        println!("    {:6}           @ {:.2}", entry.ticker, entry.entry_price);
    }
}

/// Write the full report JSON plus a flat cohort CSV ready for a tracking
/// sheet: one row per entry, primary and control interleaved by group.
fn save_artifacts(report: &RunReport, config: &ScanConfig, output_dir: &Path) -> Result<()> {
    let run_dir = output_dir.join(format!("{}-{}", report.run_date, &report.run_id.0[..12]));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("creating {}", run_dir.display()))?;

    let report_path = run_dir.join("report.json");
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&report_path, json)?;

    let cohort_path = run_dir.join("cohort.csv");
    let mut writer = csv::Writer::from_path(&cohort_path)?;
    writer.write_record(["date", "ticker", "group", "entry_price", "score", "scheme"])?;
    let entries = report.cohort.primary.iter().chain(&report.cohort.control);
    for entry in entries {
        write_cohort_row(&mut writer, report.run_date, entry, &config.selection)?;
    }
    writer.flush()?;

    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn write_cohort_row(
    writer: &mut csv::Writer<std::fs::File>,
    run_date: NaiveDate,
    entry: &CohortEntry,
    selection: &str,
) -> Result<()> {
    let group = serde_json::to_value(entry.group)?;
    let group = group.as_str().unwrap_or("?").to_string();
    let score = entry
        .breakdowns
        .iter()
        .find(|b| b.scheme == selection)
        .map(|b| format!("{:.2}", b.total))
        .unwrap_or_default();
    writer.write_record([
        run_date.to_string(),
        entry.ticker.clone(),
        group,
        format!("{:.4}", entry.entry_price),
        score,
        selection.to_string(),
    ])?;
    Ok(())
}

fn run_advance(ledger_path: &Path, date: Option<String>, holding_days: i64) -> Result<()> {
    let current_date = parse_date(date)?;
    let mut ledger = load_ledger(ledger_path)?;
    let newly_due = ledger.advance(current_date, holding_days);
    save_ledger(ledger_path, &ledger)?;
    if newly_due.is_empty() {
        println!("No positions matured as of {current_date}");
    } else {
        println!("Due for exit as of {current_date}:");
        for ticker in &newly_due {
            println!("  {ticker}");
        }
    }
    Ok(())
}

fn run_due(ledger_path: &Path) -> Result<()> {
    let ledger = load_ledger(ledger_path)?;
    let due = ledger.due_for_exit();
    if due.is_empty() {
        println!("No positions due for exit");
        return Ok(());
    }
    for position in ledger.positions() {
        if due.contains(&position.ticker.as_str()) {
            println!(
                "  {:6} entered {} @ {:.2}",
                position.ticker, position.entry_date, position.entry_price
            );
        }
    }
    Ok(())
}

fn run_close(ledger_path: &Path, ticker: &str, price: f64, date: Option<String>) -> Result<()> {
    if !price.is_finite() || price <= 0.0 {
        bail!("exit price must be positive, got {price}");
    }
    let exit_date = parse_date(date)?;
    let mut ledger = load_ledger(ledger_path)?;
    let realized = ledger.close(ticker, exit_date, price)?;
    save_ledger(ledger_path, &ledger)?;
    println!("Closed {ticker} @ {price:.2} ({:+.2}%)", realized * 100.0);
    Ok(())
}

fn run_validate_config(path: &Path) -> Result<()> {
    let config = ScanConfig::from_file(path)
        .with_context(|| format!("loading config {}", path.display()))?;
    println!(
        "OK: version {}, {} schemes, selection '{}'",
        config.version,
        config.schemes.len(),
        config.selection
    );
    Ok(())
}

fn load_ledger(path: &Path) -> Result<PositionLedger> {
    if !path.exists() {
        return Ok(PositionLedger::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading ledger {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing ledger {}", path.display()))
}

fn save_ledger(path: &Path, ledger: &PositionLedger) -> Result<()> {
    let json = serde_json::to_string_pretty(ledger)?;
    std::fs::write(path, json).with_context(|| format!("writing ledger {}", path.display()))?;
    Ok(())
}
