use std::collections::BTreeMap;

use serde::Serialize;

use crate::workflows::roster::{CallAssignment, FairnessTargets, ScheduleAssignment};

/// Actual versus targeted burden for one provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FairnessRow {
    pub provider: String,
    pub actual: u32,
    pub target: f64,
    pub delta: f64,
}

/// Weekend call burden per provider against `targets.weekend_call`.
pub fn weekend_call_deltas(calls: &[CallAssignment], targets: &FairnessTargets) -> Vec<FairnessRow> {
    let actuals = tally(
        calls
            .iter()
            .filter(|call| call.call_type.is_weekend())
            .map(|call| call.provider_id.as_str()),
    );
    compare(&actuals, &targets.weekend_call)
}

/// Hospital-site days per provider against `targets.hospital_days`.
pub fn hospital_day_deltas(
    schedule: &[ScheduleAssignment],
    targets: &FairnessTargets,
) -> Vec<FairnessRow> {
    let actuals = tally(
        schedule
            .iter()
            .filter(|assignment| assignment.site_type.is_hospital())
            .map(|assignment| assignment.provider_id.as_str()),
    );
    compare(&actuals, &targets.hospital_days)
}

fn tally<'a>(providers: impl Iterator<Item = &'a str>) -> BTreeMap<&'a str, u32> {
    let mut counts = BTreeMap::new();
    for provider in providers {
        *counts.entry(provider).or_insert(0) += 1;
    }
    counts
}

fn compare(actuals: &BTreeMap<&str, u32>, targets: &BTreeMap<String, f64>) -> Vec<FairnessRow> {
    let mut rows: Vec<FairnessRow> = targets
        .iter()
        .map(|(provider, target)| {
            let actual = actuals.get(provider.as_str()).copied().unwrap_or(0);
            FairnessRow {
                provider: provider.clone(),
                actual,
                target: *target,
                delta: f64::from(actual) - target,
            }
        })
        .collect();

    rows.extend(
        actuals
            .iter()
            .filter(|(provider, _)| !targets.contains_key(**provider))
            .map(|(provider, actual)| FairnessRow {
                provider: (*provider).to_string(),
                actual: *actual,
                target: 0.0,
                delta: f64::from(*actual),
            }),
    );

    rows.sort_by(|left, right| {
        right
            .delta
            .total_cmp(&left.delta)
            .then_with(|| left.provider.cmp(&right.provider))
    });
    rows
}
