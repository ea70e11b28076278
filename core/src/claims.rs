//! Pharmacy claims stream generator.
//!
//! One record per simulated claim event per day over the trailing
//! four-week window. Reject outcomes are coupled to the PBM mirror: a
//! member whose latest mirror row is plan-corrupted or terminated draws
//! an extra reject override on top of the base rate, so downstream
//! reconciliation has a real signal to find.

use crate::{
    catalog,
    context::GenContext,
    eligibility::{EligStatus, EligibilityRecord},
    error::{GenError, GenResult},
    mirror::PbmMirrorRecord,
    rng::GenRng,
    types::MemberId,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Trailing claim window, in days before "today" (inclusive of both ends).
const CLAIM_WINDOW_DAYS: i64 = 28;

/// Base reject probability for every claim.
const BASE_REJECT_RATE: f64 = 0.12;

/// Additional, independent reject draw for bad-state members. Combined
/// with the base draw by logical OR, never multiplied.
const BAD_MEMBER_OVERRIDE_RATE: f64 = 0.55;

/// Share of rejected claims that eventually resolve.
const RESOLVE_RATE: f64 = 0.85;

/// Claim rows whose member_id is nulled by the final corruption pass.
const NULL_MEMBER_ROWS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaidFlag {
    Y,
    N,
}

impl PaidFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Y => "Y",
            Self::N => "N",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionStatus {
    Resolved,
    Open,
}

impl ResolutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolved => "RESOLVED",
            Self::Open => "OPEN",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub claim_id: String,
    /// None only after the final corruption pass.
    pub member_id: Option<MemberId>,
    pub region: String,
    pub plan_id: String,
    pub product_line: String,
    pub fill_date: NaiveDate,
    pub created_timestamp: NaiveDateTime,
    pub paid_flag: PaidFlag,
    pub reject_code: Option<String>,
    pub reject_reason: Option<String>,
    /// Synthetic NDC-shaped drug identifier.
    pub ndc: String,
    pub pharmacy_id: String,
    pub resolution_status: Option<ResolutionStatus>,
    pub resolved_timestamp: Option<NaiveDateTime>,
}

pub struct ClaimsGenerator;

impl ClaimsGenerator {
    /// Produce the full claim stream for the trailing window.
    pub fn generate(
        ctx: &GenContext,
        rng: &mut GenRng,
        eligibility: &[EligibilityRecord],
        mirror: &[PbmMirrorRecord],
    ) -> GenResult<Vec<ClaimRecord>> {
        if eligibility.is_empty() {
            return Err(GenError::invalid("eligibility table must be non-empty"));
        }
        if mirror.is_empty() {
            return Err(GenError::invalid("mirror table must be non-empty"));
        }

        let bad_members = Self::bad_member_set(mirror);
        log::info!(
            "claims: {} members in bad mirror state out of {}",
            bad_members.len(),
            eligibility.len()
        );

        let mut claim_ids: HashSet<u64> = HashSet::new();
        let mut rows = Vec::new();
        let start = ctx.today - Duration::days(CLAIM_WINDOW_DAYS);

        let mut day = start;
        while day <= ctx.today {
            let daily_volume = rng.range_u64(350, 650);
            for _ in 0..daily_volume {
                let member = &eligibility[rng.next_u64_below(eligibility.len() as u64) as usize];
                rows.push(Self::one_claim(rng, &mut claim_ids, &bad_members, member, day));
            }
            day += Duration::days(1);
        }

        // Final corruption pass: a handful of unmatched claim rows.
        for _ in 0..NULL_MEMBER_ROWS {
            let i = rng.next_u64_below(rows.len() as u64) as usize;
            rows[i].member_id = None;
        }

        let rejected = rows.iter().filter(|c| c.paid_flag == PaidFlag::N).count();
        log::info!("claims: generated {} rows, {rejected} rejected", rows.len());
        Ok(rows)
    }

    fn one_claim(
        rng: &mut GenRng,
        claim_ids: &mut HashSet<u64>,
        bad_members: &HashSet<MemberId>,
        member: &EligibilityRecord,
        day: NaiveDate,
    ) -> ClaimRecord {
        let claim_id = Self::allocate_claim_id(rng, claim_ids);
        let created_timestamp = day.and_hms_opt(0, 0, 0).unwrap()
            + Duration::hours(rng.range_u64(8, 20) as i64)
            + Duration::minutes(rng.range_u64(0, 59) as i64);

        let is_bad = bad_members.contains(&member.member_id);

        // OR of two independent draws; the override draw is only
        // consumed for bad-state members.
        let mut rejected = rng.chance(BASE_REJECT_RATE);
        if is_bad && rng.chance(BAD_MEMBER_OVERRIDE_RATE) {
            rejected = true;
        }

        let (paid_flag, reject_code, reject_reason) = if rejected {
            let (code, reason) = Self::pick_reject(rng, is_bad);
            (PaidFlag::N, Some(code.to_string()), Some(reason.to_string()))
        } else {
            (PaidFlag::Y, None, None)
        };

        let (resolution_status, resolved_timestamp) = if paid_flag == PaidFlag::N {
            let delay_days = rng.normal(3.5, 2.2).clamp(0.0, 10.0) as i64;
            let candidate = created_timestamp
                + Duration::days(delay_days)
                + Duration::hours(rng.range_u64(1, 12) as i64);
            if rng.chance(RESOLVE_RATE) {
                (Some(ResolutionStatus::Resolved), Some(candidate))
            } else {
                (Some(ResolutionStatus::Open), None)
            }
        } else {
            (None, None)
        };

        ClaimRecord {
            claim_id,
            member_id: Some(member.member_id.clone()),
            region: member.region.clone(),
            plan_id: member.plan_id.clone(),
            product_line: member.product_line.clone(),
            fill_date: day,
            created_timestamp,
            paid_flag,
            reject_code,
            reject_reason,
            ndc: format!(
                "{}-{}-{}",
                rng.range_u64(10_000, 99_999),
                rng.range_u64(1_000, 9_999),
                rng.range_u64(10, 99)
            ),
            pharmacy_id: format!("PH{}", rng.range_u64(1_000, 9_999)),
            resolution_status,
            resolved_timestamp,
        }
    }

    /// Seven-digit claim id, unique per run via deterministic
    /// draw-and-retry. Collisions are rare at this volume.
    fn allocate_claim_id(rng: &mut GenRng, taken: &mut HashSet<u64>) -> String {
        loop {
            let n = rng.range_u64(1_000_000, 9_999_999);
            if taken.insert(n) {
                return format!("C{n}");
            }
        }
    }

    /// Bad members get steered toward the PBM-specific reject reasons;
    /// everyone else draws from the generic pool.
    fn pick_reject(rng: &mut GenRng, is_bad: bool) -> (&'static str, &'static str) {
        if is_bad && rng.chance(0.65) {
            catalog::REJECT_COVERAGE_TERMINATED
        } else if is_bad && rng.chance(0.50) {
            catalog::REJECT_MEMBER_NOT_FOUND
        } else {
            *rng.pick(catalog::generic_rejects())
        }
    }

    /// Latest mirror row per member (nulls excluded), flagged bad when
    /// plan-mapping-corrupted or terminated. Explicit group-and-max by
    /// created timestamp; table position is meaningless after the
    /// duplicate-override scenario appends rows out of order.
    pub fn bad_member_set(mirror: &[PbmMirrorRecord]) -> HashSet<MemberId> {
        let mut latest: HashMap<&str, &PbmMirrorRecord> = HashMap::new();
        for row in mirror {
            let Some(member) = row.member_id.as_deref() else {
                continue;
            };
            match latest.get(member) {
                // Ties go to the later table row, matching a stable
                // sort-then-take-last resolution.
                Some(existing) if existing.created_timestamp > row.created_timestamp => {}
                _ => {
                    latest.insert(member, row);
                }
            }
        }

        latest
            .into_iter()
            .filter(|(_, row)| {
                row.external_plan_id == catalog::WRONG_PLAN
                    || row.status == EligStatus::Terminated
            })
            .map(|(member, _)| member.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch_loads::{BatchLoad, BatchLoadGenerator};
    use crate::eligibility::EligibilityGenerator;
    use crate::mirror::MirrorGenerator;
    use crate::rng::{RngBank, StreamSlot};

    fn dataset(
        members: usize,
    ) -> (
        GenContext,
        Vec<EligibilityRecord>,
        Vec<BatchLoad>,
        Vec<PbmMirrorRecord>,
    ) {
        let ctx = GenContext::fixed(NaiveDate::from_ymd_opt(2026, 8, 25).unwrap());
        let bank = RngBank::new(42);
        let loads = BatchLoadGenerator::generate(
            &ctx,
            &mut bank.for_stream(StreamSlot::BatchLoads),
            18,
        )
        .unwrap();
        let elig = EligibilityGenerator::generate(
            &ctx,
            &mut bank.for_stream(StreamSlot::Eligibility),
            members,
        )
        .unwrap();
        let mirror =
            MirrorGenerator::generate(&mut bank.for_stream(StreamSlot::Mirror), &elig, &loads)
                .unwrap();
        (ctx, elig, loads, mirror)
    }

    #[test]
    fn bad_member_set_uses_latest_row_not_table_order() {
        let (_, elig, loads, _) = dataset(50);
        let mut rng = RngBank::new(42).for_stream(StreamSlot::Mirror);
        let mut rows = MirrorGenerator::faithful_mirror(&mut rng, &elig, &loads);

        // Give member 0 a clean early row and a terminated later row,
        // appended at the end of the table like scenario 5 does.
        rows[0].status = EligStatus::Active;
        let mut dup = rows[0].clone();
        dup.status = EligStatus::Terminated;
        dup.created_timestamp = rows[0].created_timestamp + Duration::days(30);
        rows.push(dup);

        let bad = ClaimsGenerator::bad_member_set(&rows);
        assert!(
            bad.contains(&elig[0].member_id),
            "latest terminated row must win over the earlier active row"
        );

        // And the reverse: latest row clean, early row terminated.
        let mut rows2 = MirrorGenerator::faithful_mirror(
            &mut RngBank::new(43).for_stream(StreamSlot::Mirror),
            &elig,
            &loads,
        );
        rows2[1].status = EligStatus::Terminated;
        rows2[1].external_plan_id = catalog::WRONG_PLAN.to_string();
        let mut fix = rows2[1].clone();
        fix.status = EligStatus::Active;
        fix.external_plan_id = "PBM_CA_01".to_string();
        fix.created_timestamp = rows2[1].created_timestamp + Duration::days(30);
        rows2.push(fix);
        let bad2 = ClaimsGenerator::bad_member_set(&rows2);
        assert!(
            !bad2.contains(&elig[1].member_id),
            "a clean latest row must clear the member"
        );
    }

    #[test]
    fn paid_reject_resolution_invariants_hold() {
        let (ctx, elig, _, mirror) = dataset(300);
        let mut rng = RngBank::new(42).for_stream(StreamSlot::Claims);
        let claims = ClaimsGenerator::generate(&ctx, &mut rng, &elig, &mirror).unwrap();
        for c in &claims {
            match c.paid_flag {
                PaidFlag::Y => {
                    assert!(c.reject_code.is_none());
                    assert!(c.reject_reason.is_none());
                    assert!(c.resolution_status.is_none());
                    assert!(c.resolved_timestamp.is_none());
                }
                PaidFlag::N => {
                    assert!(c.reject_code.is_some());
                    assert!(c.reject_reason.is_some());
                    match c.resolution_status {
                        Some(ResolutionStatus::Resolved) => {
                            let ts = c.resolved_timestamp.expect("resolved needs a timestamp");
                            let lag = ts - c.created_timestamp;
                            assert!(lag >= Duration::hours(1));
                            assert!(lag <= Duration::days(10) + Duration::hours(12));
                        }
                        Some(ResolutionStatus::Open) => {
                            assert!(c.resolved_timestamp.is_none())
                        }
                        None => panic!("rejected claim without resolution status"),
                    }
                }
            }
        }
    }

    #[test]
    fn claim_ids_are_unique() {
        let (ctx, elig, _, mirror) = dataset(200);
        let mut rng = RngBank::new(42).for_stream(StreamSlot::Claims);
        let claims = ClaimsGenerator::generate(&ctx, &mut rng, &elig, &mirror).unwrap();
        let mut ids: Vec<_> = claims.iter().map(|c| c.claim_id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), claims.len());
    }

    #[test]
    fn generic_rejects_only_for_good_members() {
        let (ctx, elig, _, mirror) = dataset(400);
        let bad = ClaimsGenerator::bad_member_set(&mirror);
        let mut rng = RngBank::new(42).for_stream(StreamSlot::Claims);
        let claims = ClaimsGenerator::generate(&ctx, &mut rng, &elig, &mirror).unwrap();
        for c in claims.iter().filter(|c| c.paid_flag == PaidFlag::N) {
            let Some(member) = &c.member_id else { continue };
            if !bad.contains(member) {
                let code = c.reject_code.as_deref().unwrap();
                assert!(
                    code == "70" || code == "75",
                    "good member drew PBM-specific reject {code}"
                );
            }
        }
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let (ctx, elig, _, mirror) = dataset(10);
        let mut rng = RngBank::new(42).for_stream(StreamSlot::Claims);
        assert!(matches!(
            ClaimsGenerator::generate(&ctx, &mut rng, &[], &mirror),
            Err(GenError::InvalidArgument { .. })
        ));
        assert!(matches!(
            ClaimsGenerator::generate(&ctx, &mut rng, &elig, &[]),
            Err(GenError::InvalidArgument { .. })
        ));
    }
}
