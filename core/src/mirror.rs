//! PBM-loaded eligibility mirror generator and defect injection.
//!
//! Step 1 builds a faithful one-row-per-member mirror of the source
//! eligibility table, each row attributed to a uniformly chosen batch
//! load. Step 2 corrupts a controlled 10% slice of the table, split
//! five ways across the known mismatch scenarios. Step 3 sprinkles a
//! handful of generic data-quality defects on top.
//!
//! RULES:
//!   - No row is ever deleted. Defects mutate in place or append.
//!   - The effective record for a member is the one with the greatest
//!     pbm_record_created_ts (last writer wins), never table position.

use crate::{
    batch_loads::BatchLoad,
    catalog,
    eligibility::{EligStatus, EligibilityRecord},
    error::{GenError, GenResult},
    rng::GenRng,
    types::{BatchId, MemberId},
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Fraction of mirror rows handed to scenario injection.
pub const SCENARIO_SHARE: f64 = 0.10;

/// Hard cap on members receiving a duplicate overriding row.
pub const DUPLICATE_CAP: usize = 300;

/// Rows hit by each generic data-quality pass.
const NULL_MEMBER_ROWS: usize = 10;
const LEGACY_DATE_ROWS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PbmMirrorRecord {
    /// None simulates an unmatched/corrupt extract row.
    pub member_id: Option<MemberId>,
    pub region: String,
    pub external_plan_id: String,
    pub plan_id_ref: String,
    pub product_line: String,
    pub effective_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: EligStatus,
    pub batch_id: BatchId,
    pub file_version: String,
    pub load_timestamp: NaiveDateTime,
    pub created_timestamp: NaiveDateTime,
}

/// The five cross-system drift scenarios, dispatched over disjoint
/// index subsets of the mirror table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchScenario {
    /// PBM shows the member terminated while the source may be ACTIVE.
    PrematureTermination,
    /// External plan id overwritten with a wrong-plan sentinel.
    PlanMappingCorruption,
    /// Termination date advanced by exactly one day.
    DateDrift,
    /// Batch arrival shifted six days late.
    DelayedLoad,
    /// A second, overriding row appended from the latest batch.
    DuplicateOverride,
}

impl MismatchScenario {
    /// Injection order. Fixed: chunk k of the affected-index split
    /// always receives scenario ALL[k].
    pub const ALL: [MismatchScenario; 5] = [
        Self::PrematureTermination,
        Self::PlanMappingCorruption,
        Self::DateDrift,
        Self::DelayedLoad,
        Self::DuplicateOverride,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::PrematureTermination => "premature_termination",
            Self::PlanMappingCorruption => "plan_mapping_corruption",
            Self::DateDrift => "date_drift",
            Self::DelayedLoad => "delayed_load",
            Self::DuplicateOverride => "duplicate_override",
        }
    }
}

pub struct MirrorGenerator;

impl MirrorGenerator {
    /// Full mirror build: faithful copy, scenario injection, generic
    /// noise. Draws from `rng` in exactly this order; do not reorder.
    pub fn generate(
        rng: &mut GenRng,
        eligibility: &[EligibilityRecord],
        batch_loads: &[BatchLoad],
    ) -> GenResult<Vec<PbmMirrorRecord>> {
        if eligibility.is_empty() {
            return Err(GenError::invalid("eligibility table must be non-empty"));
        }
        if batch_loads.is_empty() {
            return Err(GenError::invalid("batch load ledger must be non-empty"));
        }

        let mut rows = Self::faithful_mirror(rng, eligibility, batch_loads);
        let baseline = rows.len();

        let partition = Self::scenario_partition(rng, rows.len());
        for (scenario, indices) in &partition {
            Self::apply_scenario(*scenario, indices, &mut rows, batch_loads);
        }
        Self::apply_generic_noise(rng, &mut rows);

        log::info!(
            "mirror: {} rows ({} faithful, {} appended by duplicate override)",
            rows.len(),
            baseline,
            rows.len() - baseline
        );
        Ok(rows)
    }

    /// Step 1: one faithful row per eligibility record, attributed to a
    /// uniformly sampled batch. Creation lands 1–240 minutes after the
    /// batch's load timestamp.
    pub fn faithful_mirror(
        rng: &mut GenRng,
        eligibility: &[EligibilityRecord],
        batch_loads: &[BatchLoad],
    ) -> Vec<PbmMirrorRecord> {
        let mut rows = Vec::with_capacity(eligibility.len());
        for src in eligibility {
            let batch = rng.pick(batch_loads);
            let created_timestamp =
                batch.load_timestamp + Duration::minutes(rng.range_u64(1, 240) as i64);
            rows.push(PbmMirrorRecord {
                member_id: Some(src.member_id.clone()),
                region: src.region.clone(),
                external_plan_id: catalog::external_plan_for(&src.plan_id).to_string(),
                plan_id_ref: src.plan_id.clone(),
                product_line: src.product_line.clone(),
                effective_date: src.effective_date,
                end_date: src.end_date,
                status: src.status,
                batch_id: batch.batch_id.clone(),
                file_version: batch.file_version.clone(),
                load_timestamp: batch.load_timestamp,
                created_timestamp,
            });
        }
        rows
    }

    /// Step 2 selection: 10% of row indices without replacement, split
    /// into five near-equal chunks. When the count does not divide
    /// evenly the earlier chunks absorb the remainder.
    pub fn scenario_partition(
        rng: &mut GenRng,
        row_count: usize,
    ) -> Vec<(MismatchScenario, Vec<usize>)> {
        let affected = rng.sample_indices(row_count, (row_count as f64 * SCENARIO_SHARE) as usize);
        let chunk_count = MismatchScenario::ALL.len();
        let base = affected.len() / chunk_count;
        let remainder = affected.len() % chunk_count;

        let mut out = Vec::with_capacity(chunk_count);
        let mut cursor = 0usize;
        for (k, scenario) in MismatchScenario::ALL.iter().enumerate() {
            let size = base + usize::from(k < remainder);
            out.push((*scenario, affected[cursor..cursor + size].to_vec()));
            cursor += size;
        }
        out
    }

    /// Step 2 dispatch: mutate the chunk's rows in place, except for
    /// DuplicateOverride which appends new rows.
    pub fn apply_scenario(
        scenario: MismatchScenario,
        indices: &[usize],
        rows: &mut Vec<PbmMirrorRecord>,
        batch_loads: &[BatchLoad],
    ) {
        match scenario {
            MismatchScenario::PrematureTermination => {
                for &i in indices {
                    rows[i].end_date = rows[i].effective_date + Duration::days(20);
                    rows[i].status = EligStatus::Terminated;
                }
            }
            MismatchScenario::PlanMappingCorruption => {
                for &i in indices {
                    rows[i].external_plan_id = catalog::WRONG_PLAN.to_string();
                }
            }
            MismatchScenario::DateDrift => {
                // Never fires on still-open eligibility.
                for &i in indices {
                    if rows[i].end_date != catalog::open_end_date() {
                        rows[i].end_date += Duration::days(1);
                    }
                }
            }
            MismatchScenario::DelayedLoad => {
                for &i in indices {
                    rows[i].load_timestamp += Duration::days(6);
                    rows[i].created_timestamp += Duration::days(6);
                }
            }
            MismatchScenario::DuplicateOverride => {
                Self::append_duplicate_overrides(indices, rows, batch_loads);
            }
        }
    }

    /// Scenario 5: for each affected member (chunk order, truncated at
    /// DUPLICATE_CAP — never re-sampled), clone that member's first
    /// mirror row, re-attribute it to the chronologically latest batch,
    /// and append it terminated with a short end date. The appended row
    /// wins last-writer-wins resolution by construction.
    fn append_duplicate_overrides(
        indices: &[usize],
        rows: &mut Vec<PbmMirrorRecord>,
        batch_loads: &[BatchLoad],
    ) {
        let members: Vec<MemberId> = indices
            .iter()
            .filter_map(|&i| rows[i].member_id.clone())
            .collect();
        if members.is_empty() {
            return;
        }

        // Ledger timestamps are strictly increasing, so max is unique.
        let latest = batch_loads
            .iter()
            .max_by_key(|b| b.load_timestamp)
            .expect("non-empty ledger checked by caller");

        for member in members.iter().take(DUPLICATE_CAP) {
            let Some(base) = rows
                .iter()
                .find(|r| r.member_id.as_ref() == Some(member))
                .cloned()
            else {
                continue;
            };
            let mut dup = base;
            dup.batch_id = latest.batch_id.clone();
            dup.file_version = latest.file_version.clone();
            dup.load_timestamp = latest.load_timestamp;
            dup.created_timestamp = latest.load_timestamp + Duration::minutes(10);
            dup.status = EligStatus::Terminated;
            dup.end_date = dup.effective_date + Duration::days(5);
            rows.push(dup);
        }
    }

    /// Step 3: generic data-quality noise, applied over the full table
    /// including appended rows. May overlap scenario-affected rows.
    pub fn apply_generic_noise(rng: &mut GenRng, rows: &mut [PbmMirrorRecord]) {
        for _ in 0..NULL_MEMBER_ROWS {
            let i = rng.next_u64_below(rows.len() as u64) as usize;
            rows[i].member_id = None;
        }
        for _ in 0..LEGACY_DATE_ROWS {
            let i = rng.next_u64_below(rows.len() as u64) as usize;
            rows[i].end_date = catalog::legacy_bad_date();
        }
    }
}
