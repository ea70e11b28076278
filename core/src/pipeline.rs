//! The generation pipeline — wires the four generators together.
//!
//! GENERATION ORDER (fixed, documented, never reordered):
//!   1. Batch load ledger
//!   2. Eligibility (system of record)
//!   3. PBM mirror + defect injection
//!   4. Pharmacy claims
//!
//! RULES:
//!   - Each generator fully materializes its table before the next
//!     consumes it. No streaming, no partial results.
//!   - All randomness flows through the RngBank; each generator draws
//!     only from its own stream slot.
//!   - Single-threaded by design; concurrency would break stream order
//!     and with it reproducibility.

use crate::{
    batch_loads::{BatchLoad, BatchLoadGenerator},
    claims::{ClaimRecord, ClaimsGenerator},
    context::GenContext,
    eligibility::{EligibilityGenerator, EligibilityRecord},
    error::GenResult,
    mirror::{MirrorGenerator, PbmMirrorRecord},
    rng::{RngBank, StreamSlot},
    types::Seed,
};
use serde::{Deserialize, Serialize};

/// Table sizing for one run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RunSizes {
    pub batch_count: usize,
    pub member_count: usize,
}

impl Default for RunSizes {
    fn default() -> Self {
        Self {
            batch_count: 18,
            member_count: 6000,
        }
    }
}

/// One complete snapshot dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub batch_loads: Vec<BatchLoad>,
    pub eligibility: Vec<EligibilityRecord>,
    pub pbm_mirror: Vec<PbmMirrorRecord>,
    pub claims: Vec<ClaimRecord>,
}

pub struct FixturePipeline {
    ctx: GenContext,
    rng_bank: RngBank,
    seed: Seed,
}

impl FixturePipeline {
    pub fn new(seed: Seed, ctx: GenContext) -> Self {
        Self {
            ctx,
            rng_bank: RngBank::new(seed),
            seed,
        }
    }

    pub fn seed(&self) -> Seed {
        self.seed
    }

    pub fn generate_batch_loads(&self, count: usize) -> GenResult<Vec<BatchLoad>> {
        let mut rng = self.rng_bank.for_stream(StreamSlot::BatchLoads);
        BatchLoadGenerator::generate(&self.ctx, &mut rng, count)
    }

    pub fn generate_eligibility(&self, member_count: usize) -> GenResult<Vec<EligibilityRecord>> {
        let mut rng = self.rng_bank.for_stream(StreamSlot::Eligibility);
        EligibilityGenerator::generate(&self.ctx, &mut rng, member_count)
    }

    pub fn generate_pbm_mirror(
        &self,
        eligibility: &[EligibilityRecord],
        batch_loads: &[BatchLoad],
    ) -> GenResult<Vec<PbmMirrorRecord>> {
        let mut rng = self.rng_bank.for_stream(StreamSlot::Mirror);
        MirrorGenerator::generate(&mut rng, eligibility, batch_loads)
    }

    pub fn generate_claims(
        &self,
        eligibility: &[EligibilityRecord],
        pbm_mirror: &[PbmMirrorRecord],
    ) -> GenResult<Vec<ClaimRecord>> {
        let mut rng = self.rng_bank.for_stream(StreamSlot::Claims);
        ClaimsGenerator::generate(&self.ctx, &mut rng, eligibility, pbm_mirror)
    }

    /// Run the full dependency chain and return every table.
    pub fn run(&self, sizes: RunSizes) -> GenResult<Dataset> {
        log::info!(
            "pipeline: seed={} batches={} members={}",
            self.seed,
            sizes.batch_count,
            sizes.member_count
        );
        let batch_loads = self.generate_batch_loads(sizes.batch_count)?;
        let eligibility = self.generate_eligibility(sizes.member_count)?;
        let pbm_mirror = self.generate_pbm_mirror(&eligibility, &batch_loads)?;
        let claims = self.generate_claims(&eligibility, &pbm_mirror)?;
        Ok(Dataset {
            batch_loads,
            eligibility,
            pbm_mirror,
            claims,
        })
    }
}
