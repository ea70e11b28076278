//! fixture-gen: headless fixture generator for the PBM reconciliation
//! test datasets.
//!
//! Usage:
//!   fixture-gen --seed 42 --members 6000 --batches 18 --out-dir ./data/raw
//!
//! Writes four CSV artifacts, one per table. All semantics live in
//! rxmirror-core; this binary is a thin argument-parsing and CSV shim.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rxmirror_core::{
    batch_loads::BatchLoad, claims::ClaimRecord, eligibility::EligibilityRecord,
    mirror::PbmMirrorRecord, Dataset, FixturePipeline, GenContext, RunSizes,
};
use std::env;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let members = parse_arg(&args, "--members", 6000usize);
    let batches = parse_arg(&args, "--batches", 18usize);
    let out_dir = args
        .windows(2)
        .find(|w| w[0] == "--out-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data/raw")
        .to_string();

    println!("fixture-gen");
    println!("  seed:     {seed}");
    println!("  members:  {members}");
    println!("  batches:  {batches}");
    println!("  out_dir:  {out_dir}");
    println!();

    let pipeline = FixturePipeline::new(seed, GenContext::from_wall_clock());
    let dataset = pipeline.run(RunSizes {
        batch_count: batches,
        member_count: members,
    })?;

    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating output directory {out_dir}"))?;
    write_tables(Path::new(&out_dir), &dataset)?;

    println!("Wrote CSVs to: {out_dir}");
    println!(
        "Row counts: file_loads={} eligibility={} pbm_loaded={} rx_claims={}",
        dataset.batch_loads.len(),
        dataset.eligibility.len(),
        dataset.pbm_mirror.len(),
        dataset.claims.len()
    );
    Ok(())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn write_tables(dir: &Path, dataset: &Dataset) -> Result<()> {
    write_csv(
        &dir.join("eligibility_file_loads.csv"),
        "batch_id,file_version,pbm_load_datetime,records_in_file,source_system",
        &dataset.batch_loads,
        batch_load_row,
    )?;
    write_csv(
        &dir.join("eligibility_current.csv"),
        "member_id,state,plan_id,pbm_plan_id,product_line,elig_effective_date,\
         elig_end_date,elig_status,internal_last_update_ts,dob_fake",
        &dataset.eligibility,
        eligibility_row,
    )?;
    write_csv(
        &dir.join("pbm_eligibility_loaded.csv"),
        "member_id,state,pbm_plan_id,plan_id_ref,product_line,pbm_elig_effective_date,\
         pbm_elig_end_date,pbm_elig_status,batch_id,file_version,pbm_load_datetime,\
         pbm_record_created_ts",
        &dataset.pbm_mirror,
        mirror_row,
    )?;
    write_csv(
        &dir.join("rx_claims.csv"),
        "claim_id,member_id,state,plan_id,product_line,fill_date,claim_created_ts,\
         paid_flag,reject_code,reject_reason,ndc_fake,pharmacy_id_fake,\
         resolution_status,resolved_ts",
        &dataset.claims,
        claim_row,
    )?;
    Ok(())
}

fn write_csv<T>(
    path: &Path,
    header: &str,
    rows: &[T],
    to_row: impl Fn(&T) -> String,
) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "{header}")?;
    for row in rows {
        writeln!(out, "{}", to_row(row))?;
    }
    out.flush()?;
    log::info!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

// ── Row formatting ─────────────────────────────────────────────────
// No field in any table can contain a comma or quote, so plain joins
// are safe. None renders as an empty cell.

fn fmt_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

fn fmt_ts(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn opt<T, F: Fn(&T) -> String>(value: &Option<T>, f: F) -> String {
    value.as_ref().map(f).unwrap_or_default()
}

fn batch_load_row(b: &BatchLoad) -> String {
    format!(
        "{},{},{},{},{}",
        b.batch_id,
        b.file_version,
        fmt_ts(b.load_timestamp),
        b.record_count,
        b.source_system
    )
}

fn eligibility_row(e: &EligibilityRecord) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{},{}",
        e.member_id,
        e.region,
        e.plan_id,
        e.external_plan_id,
        e.product_line,
        fmt_date(e.effective_date),
        fmt_date(e.end_date),
        e.status.as_str(),
        fmt_ts(e.last_update_ts),
        fmt_date(e.date_of_birth)
    )
}

fn mirror_row(m: &PbmMirrorRecord) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{},{},{},{}",
        opt(&m.member_id, |s| s.clone()),
        m.region,
        m.external_plan_id,
        m.plan_id_ref,
        m.product_line,
        fmt_date(m.effective_date),
        fmt_date(m.end_date),
        m.status.as_str(),
        m.batch_id,
        m.file_version,
        fmt_ts(m.load_timestamp),
        fmt_ts(m.created_timestamp)
    )
}

fn claim_row(c: &ClaimRecord) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        c.claim_id,
        opt(&c.member_id, |s| s.clone()),
        c.region,
        c.plan_id,
        c.product_line,
        fmt_date(c.fill_date),
        fmt_ts(c.created_timestamp),
        c.paid_flag.as_str(),
        opt(&c.reject_code, |s| s.clone()),
        opt(&c.reject_reason, |s| s.clone()),
        c.ndc,
        c.pharmacy_id,
        opt(&c.resolution_status, |s| s.as_str().to_string()),
        opt(&c.resolved_timestamp, |ts| fmt_ts(*ts))
    )
}
