use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::workflows::roster::{ScheduleAssignment, SessionBlock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct GapSlot {
    pub date: NaiveDate,
    pub block: SessionBlock,
}

/// Unstaffed sessions at one site, in date then session order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteGaps {
    pub site: String,
    pub gaps: Vec<GapSlot>,
}

/// Sessions on `days` where a site seen anywhere in `schedule` has nobody assigned.
///
/// Unlabelled assignments are ignored and fully staffed sites are left out. Sites are listed
/// alphabetically.
pub fn coverage_gaps(schedule: &[ScheduleAssignment], days: &[NaiveDate]) -> Vec<SiteGaps> {
    let mut staffed: BTreeMap<&str, BTreeSet<(NaiveDate, SessionBlock)>> = BTreeMap::new();
    for assignment in schedule {
        let site = assignment.site.trim();
        if site.is_empty() {
            continue;
        }
        staffed
            .entry(site)
            .or_default()
            .insert((assignment.date, assignment.block));
    }

    staffed
        .into_iter()
        .filter_map(|(site, covered)| {
            let gaps: Vec<GapSlot> = days
                .iter()
                .flat_map(|&date| {
                    [SessionBlock::Am, SessionBlock::Pm]
                        .into_iter()
                        .map(move |block| GapSlot { date, block })
                })
                .filter(|slot| !covered.contains(&(slot.date, slot.block)))
                .collect();
            (!gaps.is_empty()).then(|| SiteGaps {
                site: site.to_string(),
                gaps,
            })
        })
        .collect()
}
