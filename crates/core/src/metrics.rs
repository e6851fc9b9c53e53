//! Quality metrics folded from reviewed defect reports.
//!
//! Rejected reports are never counted as defects. Defect rate and
//! incentive tier only use validated quantities.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::review::{DefectReport, ReviewStatus};
use crate::types::DefectCode;

// ---------------------------------------------------------------------------
// Incentive tiers
// ---------------------------------------------------------------------------

/// Highest defect rate (percent) still earning the gold tier.
pub const GOLD_MAX_DEFECT_RATE: f64 = 2.0;
/// Highest defect rate (percent) still earning the silver tier.
pub const SILVER_MAX_DEFECT_RATE: f64 = 5.0;
/// Highest defect rate (percent) still earning the bronze tier.
pub const BRONZE_MAX_DEFECT_RATE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncentiveTier {
    None,
    Bronze,
    Silver,
    Gold,
}

/// Tier earned by a line at the given defect rate (percent).
pub fn incentive_tier(defect_rate: f64) -> IncentiveTier {
    if defect_rate.is_nan() {
        IncentiveTier::None
    } else if defect_rate <= GOLD_MAX_DEFECT_RATE {
        IncentiveTier::Gold
    } else if defect_rate <= SILVER_MAX_DEFECT_RATE {
        IncentiveTier::Silver
    } else if defect_rate <= BRONZE_MAX_DEFECT_RATE {
        IncentiveTier::Bronze
    } else {
        IncentiveTier::None
    }
}

// ---------------------------------------------------------------------------
// Rates
// ---------------------------------------------------------------------------

/// Defective pieces as a percentage of inspected pieces.
pub fn defect_rate(defective: u64, inspected: u64) -> Result<f64, CoreError> {
    if inspected == 0 {
        return Err(CoreError::Validation(
            "Inspected piece count must be positive".to_string(),
        ));
    }
    if defective > inspected {
        return Err(CoreError::Validation(format!(
            "Defective pieces ({defective}) exceed inspected pieces ({inspected})"
        )));
    }
    Ok(defective as f64 * 100.0 / inspected as f64)
}

/// Validated reports as a percentage of decided reports.
///
/// `None` when no report has been decided yet.
pub fn validation_rate(reports: &[DefectReport]) -> Option<f64> {
    let validated = count_status(reports, ReviewStatus::Validated);
    let rejected = count_status(reports, ReviewStatus::Rejected);
    let decided = validated + rejected;
    if decided == 0 {
        None
    } else {
        Some(validated as f64 * 100.0 / decided as f64)
    }
}

fn count_status(reports: &[DefectReport], status: ReviewStatus) -> usize {
    reports.iter().filter(|r| r.status == status).count()
}

// ---------------------------------------------------------------------------
// Histograms
// ---------------------------------------------------------------------------

/// Defect quantity per garment part, most frequent first.
pub fn count_by_garment_part(reports: &[DefectReport]) -> Vec<(String, u64)> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for r in counted(reports) {
        *counts.entry(r.garment_part_code.as_str()).or_default() += u64::from(r.quantity);
    }
    let mut out: Vec<(String, u64)> = counts
        .into_iter()
        .map(|(code, n)| (code.to_string(), n))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// Defect quantity per defect type, most frequent first.
pub fn count_by_defect_type(reports: &[DefectReport]) -> Vec<(DefectCode, u64)> {
    let mut counts: HashMap<DefectCode, u64> = HashMap::new();
    for r in counted(reports) {
        *counts.entry(r.defect_type_code).or_default() += u64::from(r.quantity);
    }
    let mut out: Vec<(DefectCode, u64)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// Defect quantity per UTC calendar day of reporting, oldest first.
pub fn daily_counts(reports: &[DefectReport]) -> Vec<(NaiveDate, u64)> {
    let mut days: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for r in counted(reports) {
        *days.entry(r.reported_at.date_naive()).or_default() += u64::from(r.quantity);
    }
    days.into_iter().collect()
}

fn counted(reports: &[DefectReport]) -> impl Iterator<Item = &DefectReport> {
    reports
        .iter()
        .filter(|r| r.status != ReviewStatus::Rejected)
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Dashboard summary for one plant, line or shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitySummary {
    pub total_reports: usize,
    pub pending: usize,
    pub validated: usize,
    pub rejected: usize,
    pub validated_defects: u64,
    pub inspected: u64,
    pub defect_rate: f64,
    pub validation_rate: Option<f64>,
    pub incentive_tier: IncentiveTier,
}

/// Summarise reports against the number of pieces inspected.
pub fn summarize(reports: &[DefectReport], inspected: u64) -> Result<QualitySummary, CoreError> {
    let validated_defects: u64 = reports
        .iter()
        .filter(|r| r.status == ReviewStatus::Validated)
        .map(|r| u64::from(r.quantity))
        .sum();
    let rate = defect_rate(validated_defects, inspected)?;

    Ok(QualitySummary {
        total_reports: reports.len(),
        pending: count_status(reports, ReviewStatus::Pending),
        validated: count_status(reports, ReviewStatus::Validated),
        rejected: count_status(reports, ReviewStatus::Rejected),
        validated_defects,
        inspected,
        defect_rate: rate,
        validation_rate: validation_rate(reports),
        incentive_tier: incentive_tier(rate),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
