//! Reference catalog — static enumerations shared by every generator.
//!
//! Pure data, no behavior beyond lookup helpers. Region codes, product
//! lines, the plan → external-plan mapping carried by the PBM extract,
//! and the NCPDP-style reject code/reason pairs.

use chrono::NaiveDate;

pub const REGIONS: [&str; 5] = ["CA", "TX", "FL", "WA", "OH"];

pub const PRODUCT_LINES: [&str; 3] = ["Medicaid", "Marketplace", "Medicare"];

/// (plan_id, external_plan_id). Plan ids are prefixed with their region
/// code; the external id is what the PBM vendor files carry.
pub const PLANS: [(&str, &str); 6] = [
    ("CA_MCD_A", "PBM_CA_01"),
    ("CA_MCD_B", "PBM_CA_02"),
    ("TX_MCD_A", "PBM_TX_01"),
    ("FL_MCD_A", "PBM_FL_01"),
    ("WA_MCD_A", "PBM_WA_01"),
    ("OH_MCD_A", "PBM_OH_01"),
];

/// (reject_code, reject_reason). The last two entries are PBM-specific
/// and only chosen for members whose mirror record is in a bad state;
/// the first two form the generic pool.
pub const REJECT_CODES: [(&str, &str); 4] = [
    ("70", "Product/Service Not Covered"),
    ("75", "Prior Authorization Required"),
    ("26", "Coverage Terminated"),
    ("R3", "Member Not Found in PBM"),
];

pub const REJECT_COVERAGE_TERMINATED: (&str, &str) = ("26", "Coverage Terminated");
pub const REJECT_MEMBER_NOT_FOUND: (&str, &str) = ("R3", "Member Not Found in PBM");

/// Reject pool for members with a healthy mirror record — everything
/// except the two PBM-specific codes.
pub fn generic_rejects() -> &'static [(&'static str, &'static str)] {
    &REJECT_CODES[..2]
}

/// Sentinel external plan id written by the plan-mapping-corruption
/// defect scenario.
pub const WRONG_PLAN: &str = "PBM_WRONG_PLAN";

/// Fallback external plan id when a plan has no registered mapping.
pub const UNKNOWN_PLAN: &str = "PBM_UNKNOWN";

/// Constant source-system tag stamped on every batch load.
pub const SOURCE_SYSTEM: &str = "PBM_VENDOR_X";

/// Open-ended eligibility: the member has no scheduled termination.
pub fn open_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 31).unwrap()
}

/// Known-bad legacy end date seen in real vendor extracts.
pub fn legacy_bad_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap()
}

/// Plans registered to a region, matched by plan-id prefix.
/// May be empty — callers fall back to the full plan list.
pub fn plans_for_region(region: &str) -> Vec<(&'static str, &'static str)> {
    PLANS
        .iter()
        .copied()
        .filter(|(plan_id, _)| plan_id.starts_with(region))
        .collect()
}

/// External plan id for a plan, falling back to [`UNKNOWN_PLAN`] when the
/// mapping table has no entry.
pub fn external_plan_for(plan_id: &str) -> &'static str {
    PLANS
        .iter()
        .find(|(p, _)| *p == plan_id)
        .map(|(_, ext)| *ext)
        .unwrap_or(UNKNOWN_PLAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_region_has_at_least_one_plan() {
        for region in REGIONS {
            assert!(
                !plans_for_region(region).is_empty(),
                "region {region} has no registered plans"
            );
        }
    }

    #[test]
    fn external_plan_mapping_round_trips() {
        for (plan_id, external) in PLANS {
            assert_eq!(external_plan_for(plan_id), external);
        }
    }

    #[test]
    fn unknown_plan_falls_back() {
        assert_eq!(external_plan_for("ZZ_MCD_X"), UNKNOWN_PLAN);
    }
}
