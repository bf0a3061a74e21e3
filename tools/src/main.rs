//! pipeline-runner: headless batch generator for synthetic sales pipelines.
//!
//! Usage:
//!   pipeline-runner --seed 12345 --deals 50000 --as-of 2025-09-13
//!   pipeline-runner --config engine.json --out opportunities.jsonl --abort-on-error

use anyhow::{Context, Result};
use chrono::NaiveDate;
use pipeline_core::{
    assembler::OpportunityRecord,
    batch::{BatchGenerator, BatchReport, BatchSpec, FailurePolicy, SkippedDeal},
    config::EngineConfig,
    engine::DealEngine,
    roster::StaticRoster,
    types::{Classification, Segment, Stage},
};
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};

/// Written next to the records so a run can be reproduced.
#[derive(serde::Serialize)]
struct RunManifest<'a> {
    seed:       u64,
    deals:      u64,
    start_date: NaiveDate,
    as_of:      NaiveDate,
    policy:     FailurePolicy,
    config:     Option<&'a str>,
    records:    usize,
    skipped:    &'a [SkippedDeal],
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let deals = parse_arg(&args, "--deals", 1_000u64);
    let as_of = parse_date(&args, "--as-of", "2025-09-13")?;
    let start = parse_date(&args, "--start", "2023-01-01")?;
    let out = flag_value(&args, "--out").unwrap_or("opportunities.jsonl");
    let config_path = flag_value(&args, "--config");
    let policy = if args.iter().any(|a| a == "--abort-on-error") {
        FailurePolicy::AbortAll
    } else {
        FailurePolicy::SkipAndLog
    };

    println!("Sales pipeline generator: pipeline-runner");
    println!("  seed:      {seed}");
    println!("  deals:     {deals}");
    println!("  window:    {start} .. {as_of}");
    println!("  config:    {}", config_path.unwrap_or("(standard)"));
    println!("  out:       {out}");
    println!();

    let config = match config_path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::standard(),
    };
    let engine = DealEngine::new(config)?;
    let roster = StaticRoster::standard();

    let spec = BatchSpec {
        deals,
        seed,
        start_date: start,
        as_of,
        policy,
    };
    let report = BatchGenerator::new(&engine, &roster, spec)?.run()?;

    write_jsonl(out, &report.records)?;

    let manifest = RunManifest {
        seed,
        deals,
        start_date: start,
        as_of,
        policy,
        config: config_path,
        records: report.records.len(),
        skipped: &report.skipped,
    };
    let manifest_path = format!("{out}.manifest.json");
    std::fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
        .with_context(|| format!("Cannot write {manifest_path}"))?;

    print_summary(&engine, &report);
    Ok(())
}

fn write_jsonl(path: &str, records: &[OpportunityRecord]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Cannot create {path}"))?;
    let mut writer = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    log::info!("Wrote {} records to {path}", records.len());
    Ok(())
}

fn print_summary(engine: &DealEngine, report: &BatchReport) {
    let records = &report.records;
    let won = records.iter().filter(|r| r.stage == Stage::ClosedWon).count();
    let lost = records.iter().filter(|r| r.stage == Stage::ClosedLost).count();
    let open = records.len() - won - lost;
    let pipeline: f64 = records
        .iter()
        .filter(|r| !r.is_closed)
        .map(|r| r.expected_revenue)
        .sum();
    let bookings: f64 = records.iter().filter(|r| r.is_won).map(|r| r.amount).sum();

    println!("=== RUN SUMMARY ===");
    println!("  records:        {}", records.len());
    println!("  skipped:        {}", report.skipped.len());
    println!("  closed won:     {won}");
    println!("  closed lost:    {lost}");
    println!("  open:           {open}");
    println!("  bookings:       ${bookings:.0}");
    println!("  open pipeline:  ${pipeline:.0} (probability-weighted)");

    println!();
    println!("=== WIN RATES (observed vs nominal) ===");
    for segment in Segment::ALL {
        for classification in Classification::ALL {
            let Ok(profile) = engine.registry().resolve(segment, classification) else {
                continue;
            };
            let closed: Vec<&OpportunityRecord> = records
                .iter()
                .filter(|r| r.segment == segment && r.classification == classification && r.is_closed)
                .collect();
            if closed.is_empty() {
                continue;
            }
            let wins = closed.iter().filter(|r| r.is_won).count();
            let observed = wins as f64 / closed.len() as f64;
            println!(
                "  {:<11} {:<17} n={:<6} observed={:>5.1}%  nominal={:>5.1}%",
                segment.label(),
                classification.label(),
                closed.len(),
                observed * 100.0,
                profile.nominal_win_rate * 100.0
            );
        }
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_date(args: &[String], flag: &str, default: &str) -> Result<NaiveDate> {
    let raw = flag_value(args, flag).unwrap_or(default);
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("{flag} expects YYYY-MM-DD, got '{raw}'"))
}
