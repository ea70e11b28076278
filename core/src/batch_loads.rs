//! Batch load ledger generator.
//!
//! One row per simulated ingestion event of the PBM vendor eligibility
//! file. Batches arrive on a fixed 36-hour cadence over the trailing
//! four weeks; the file version string rolls its minor digit each batch
//! and its major digit every sixth batch.

use crate::{
    catalog,
    context::GenContext,
    error::{GenError, GenResult},
    rng::GenRng,
    types::BatchId,
};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Interval between consecutive batch loads.
const CADENCE_HOURS: i64 = 36;

/// How far back the first batch lands, relative to "now".
const LEDGER_WINDOW_DAYS: i64 = 28;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchLoad {
    pub batch_id: BatchId,
    pub file_version: String,
    pub load_timestamp: NaiveDateTime,
    pub record_count: u32,
    pub source_system: String,
}

pub struct BatchLoadGenerator;

impl BatchLoadGenerator {
    /// Produce `count` batch loads with monotonically increasing load
    /// timestamps. Pure generation; the only failure is a zero count.
    pub fn generate(
        ctx: &GenContext,
        rng: &mut GenRng,
        count: usize,
    ) -> GenResult<Vec<BatchLoad>> {
        if count == 0 {
            return Err(GenError::invalid("batch count must be > 0"));
        }

        // Nightly 02:00 load slot, four weeks back.
        let base = ctx.now.date().and_hms_opt(2, 0, 0).unwrap()
            - Duration::days(LEDGER_WINDOW_DAYS);

        let mut rows = Vec::with_capacity(count);
        for i in 0..count {
            let load_timestamp = base + Duration::hours(CADENCE_HOURS * i as i64);
            rows.push(BatchLoad {
                batch_id: format!("BATCH_{}_{i:02}", load_timestamp.format("%Y%m%d")),
                file_version: format!("v{}.{}", 1 + i / 6, i % 6),
                load_timestamp,
                record_count: rng.range_u64(1500, 4000) as u32,
                source_system: catalog::SOURCE_SYSTEM.to_string(),
            });
        }

        log::info!("batch_loads: generated {count} ingestion batches");
        Ok(rows)
    }
}
