//! System-of-record eligibility generator.
//!
//! One row per member, member ids allocated sequentially. This table is
//! the ground truth the PBM mirror is later allowed to drift away from.

use crate::{
    catalog,
    context::GenContext,
    error::{GenError, GenResult},
    rng::GenRng,
    types::MemberId,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Share of members left ACTIVE with an open-ended end date.
const ACTIVE_SHARE: f64 = 0.72;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EligStatus {
    Active,
    Terminated,
}

impl EligStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Terminated => "TERMINATED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityRecord {
    pub member_id: MemberId,
    pub region: String,
    pub plan_id: String,
    pub external_plan_id: String,
    pub product_line: String,
    pub effective_date: NaiveDate,
    /// Either the open-ended sentinel (9999-12-31) or a concrete
    /// termination date. ACTIVE ⇔ sentinel, always.
    pub end_date: NaiveDate,
    pub status: EligStatus,
    pub last_update_ts: NaiveDateTime,
    /// Synthetic adult date of birth. Fabricated, never sourced.
    pub date_of_birth: NaiveDate,
}

pub struct EligibilityGenerator;

impl EligibilityGenerator {
    /// Produce `member_count` eligibility records. Uniqueness of
    /// member_id comes from sequential allocation, not sampling.
    pub fn generate(
        ctx: &GenContext,
        rng: &mut GenRng,
        member_count: usize,
    ) -> GenResult<Vec<EligibilityRecord>> {
        if member_count == 0 {
            return Err(GenError::invalid("member count must be > 0"));
        }

        let window_start = ctx.today - Duration::days(90);
        let mut rows = Vec::with_capacity(member_count);

        for i in 0..member_count {
            let member_id = format!("M{}", 100_000 + i);
            let region = *rng.pick(&catalog::REGIONS);
            let (plan_id, external_plan_id) = Self::pick_plan(rng, region);
            let product_line = *rng.pick(&catalog::PRODUCT_LINES);

            let effective_date =
                window_start + Duration::days(rng.range_u64(0, 60) as i64);

            let (status, end_date) = if rng.chance(ACTIVE_SHARE) {
                (EligStatus::Active, catalog::open_end_date())
            } else {
                let term = effective_date + Duration::days(rng.range_u64(10, 70) as i64);
                (EligStatus::Terminated, term)
            };

            let last_update_ts = ctx.now
                - Duration::days(rng.range_u64(0, 25) as i64)
                - Duration::hours(rng.range_u64(0, 23) as i64);

            // Adult DOB, 18–85 years back from today.
            let date_of_birth =
                ctx.today - Duration::days(rng.range_u64(18 * 365, 85 * 365) as i64);

            rows.push(EligibilityRecord {
                member_id,
                region: region.to_string(),
                plan_id: plan_id.to_string(),
                external_plan_id: external_plan_id.to_string(),
                product_line: product_line.to_string(),
                effective_date,
                end_date,
                status,
                last_update_ts,
                date_of_birth,
            });
        }

        log::info!("eligibility: generated {member_count} member records");
        Ok(rows)
    }

    /// Uniform plan among the region's registered plans; regions with no
    /// registered plan fall back to the full list. A policy decision,
    /// not an error.
    fn pick_plan(rng: &mut GenRng, region: &str) -> (&'static str, &'static str) {
        let candidates = catalog::plans_for_region(region);
        if candidates.is_empty() {
            *rng.pick(&catalog::PLANS)
        } else {
            *rng.pick(&candidates)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, StreamSlot};

    fn generate(n: usize) -> Vec<EligibilityRecord> {
        let ctx = GenContext::fixed(NaiveDate::from_ymd_opt(2026, 8, 25).unwrap());
        let mut rng = RngBank::new(42).for_stream(StreamSlot::Eligibility);
        EligibilityGenerator::generate(&ctx, &mut rng, n).unwrap()
    }

    #[test]
    fn member_ids_are_sequential_and_unique() {
        let rows = generate(500);
        for (i, r) in rows.iter().enumerate() {
            assert_eq!(r.member_id, format!("M{}", 100_000 + i));
        }
    }

    #[test]
    fn active_iff_open_ended() {
        for r in generate(2000) {
            match r.status {
                EligStatus::Active => assert_eq!(r.end_date, catalog::open_end_date()),
                EligStatus::Terminated => {
                    assert_ne!(r.end_date, catalog::open_end_date());
                    let offset = (r.end_date - r.effective_date).num_days();
                    assert!(
                        (10..=70).contains(&offset),
                        "termination offset {offset} out of range"
                    );
                }
            }
        }
    }

    #[test]
    fn plans_match_member_region() {
        // Every catalog region currently has plans, so the fallback
        // never fires and plan prefixes must agree with the region.
        for r in generate(1000) {
            assert!(
                r.plan_id.starts_with(&r.region),
                "plan {} does not match region {}",
                r.plan_id,
                r.region
            );
            assert_eq!(r.external_plan_id, catalog::external_plan_for(&r.plan_id));
        }
    }

    #[test]
    fn dates_of_birth_are_adult() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        for r in generate(1000) {
            let age_days = (today - r.date_of_birth).num_days();
            assert!((18 * 365..=85 * 365).contains(&age_days));
        }
    }

    #[test]
    fn zero_members_is_rejected() {
        let ctx = GenContext::fixed(NaiveDate::from_ymd_opt(2026, 8, 25).unwrap());
        let mut rng = RngBank::new(42).for_stream(StreamSlot::Eligibility);
        let err = EligibilityGenerator::generate(&ctx, &mut rng, 0).unwrap_err();
        assert!(matches!(err, GenError::InvalidArgument { .. }));
    }
}
