use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::VacationBlock;
use crate::calendar;

/// Allowance units consumed by an approved request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VacationImpact {
    pub days: f64,
    pub am: f64,
    pub pm: f64,
}

/// Span errors raised while sizing a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpanViolation {
    #[error("end date {end} precedes start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("{block} requests must cover exactly one weekday (found {found})")]
    SingleWeekdayRequired { block: VacationBlock, found: usize },
    #[error("{block} requests must include at least one weekday")]
    NoWeekdays { block: VacationBlock },
}

/// Size a request by the weekdays it covers. Weekends never consume allowance.
pub fn compute_impact(
    block: VacationBlock,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<VacationImpact, SpanViolation> {
    if end < start {
        return Err(SpanViolation::EndBeforeStart { start, end });
    }

    let weekdays = calendar::business_day_count(start, end);
    let impact = match block {
        VacationBlock::Am | VacationBlock::Pm | VacationBlock::FullDay if weekdays != 1 => {
            return Err(SpanViolation::SingleWeekdayRequired {
                block,
                found: weekdays,
            });
        }
        VacationBlock::Am => VacationImpact {
            days: 0.5,
            am: 1.0,
            pm: 0.0,
        },
        VacationBlock::Pm => VacationImpact {
            days: 0.5,
            am: 0.0,
            pm: 1.0,
        },
        VacationBlock::FullDay => VacationImpact {
            days: 1.0,
            am: 1.0,
            pm: 1.0,
        },
        VacationBlock::FullWeek if weekdays == 0 => {
            return Err(SpanViolation::NoWeekdays { block });
        }
        VacationBlock::FullWeek => {
            let count = weekdays as f64;
            VacationImpact {
                days: count,
                am: count,
                pm: count,
            }
        }
    };

    Ok(impact)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn half_day_blocks_cost_half_a_day() {
        let day = date(2026, 1, 6);
        let am = compute_impact(VacationBlock::Am, day, day).expect("am impact");
        assert_eq!(am, VacationImpact { days: 0.5, am: 1.0, pm: 0.0 });
        let pm = compute_impact(VacationBlock::Pm, day, day).expect("pm impact");
        assert_eq!(pm, VacationImpact { days: 0.5, am: 0.0, pm: 1.0 });
        let full = compute_impact(VacationBlock::FullDay, day, day).expect("full day impact");
        assert_eq!(full, VacationImpact { days: 1.0, am: 1.0, pm: 1.0 });
    }

    #[test]
    fn full_week_counts_every_weekday() {
        let impact = compute_impact(VacationBlock::FullWeek, date(2026, 2, 2), date(2026, 2, 6))
            .expect("full week impact");
        assert_eq!(impact, VacationImpact { days: 5.0, am: 5.0, pm: 5.0 });
    }

    #[test]
    fn full_week_ignores_weekend_days() {
        // Friday through the following Tuesday: three weekdays.
        let impact = compute_impact(VacationBlock::FullWeek, date(2026, 2, 6), date(2026, 2, 10))
            .expect("full week impact");
        assert_eq!(impact.days, 3.0);
    }

    #[test]
    fn full_day_spanning_two_weekdays_is_rejected() {
        match compute_impact(VacationBlock::FullDay, date(2026, 1, 6), date(2026, 1, 7)) {
            Err(SpanViolation::SingleWeekdayRequired { found: 2, .. }) => {}
            other => panic!("expected single weekday violation, got {other:?}"),
        }
    }

    #[test]
    fn weekend_only_full_week_is_rejected() {
        match compute_impact(VacationBlock::FullWeek, date(2026, 1, 10), date(2026, 1, 11)) {
            Err(SpanViolation::NoWeekdays { .. }) => {}
            other => panic!("expected no weekdays violation, got {other:?}"),
        }
    }

    #[test]
    fn inverted_span_is_rejected() {
        match compute_impact(VacationBlock::FullWeek, date(2026, 2, 6), date(2026, 2, 2)) {
            Err(SpanViolation::EndBeforeStart { .. }) => {}
            other => panic!("expected end-before-start violation, got {other:?}"),
        }
    }
}
