use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar;
use crate::workflows::roster::{CallAssignment, CallType, ScheduleAssignment, SessionBlock};

/// Schedule assignments bucketed by `(date, session)`, each bucket ordered by site label.
pub fn collate_by_block(
    assignments: &[ScheduleAssignment],
) -> BTreeMap<(NaiveDate, SessionBlock), Vec<ScheduleAssignment>> {
    let mut buckets: BTreeMap<(NaiveDate, SessionBlock), Vec<ScheduleAssignment>> =
        BTreeMap::new();
    for assignment in assignments {
        buckets
            .entry((assignment.date, assignment.block))
            .or_default()
            .push(assignment.clone());
    }
    for bucket in buckets.values_mut() {
        bucket.sort_by(|left, right| left.site.cmp(&right.site));
    }
    buckets
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallSlot {
    pub label: String,
    pub provider: String,
}

/// Call coverage grouped by call type.
///
/// Weekday rows are keyed by label and the last assignment for a label wins. Weekend rows
/// keep every assignment in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CallSummary {
    pub weekday_noninvasive: BTreeMap<String, String>,
    pub weekday_interventional: BTreeMap<String, String>,
    pub weekend_noninvasive: Vec<CallSlot>,
    pub weekend_interventional: Vec<CallSlot>,
}

impl CallSummary {
    pub fn from_assignments<'a>(calls: impl IntoIterator<Item = &'a CallAssignment>) -> Self {
        let mut summary = Self::default();
        for call in calls {
            let provider = call.display_provider().to_string();
            match call.call_type {
                CallType::WeekdayNoninvasive => {
                    summary
                        .weekday_noninvasive
                        .insert(call.label.clone(), provider);
                }
                CallType::WeekdayInterventional => {
                    summary
                        .weekday_interventional
                        .insert(call.label.clone(), provider);
                }
                CallType::WeekendNoninvasive => summary.weekend_noninvasive.push(CallSlot {
                    label: call.label.clone(),
                    provider,
                }),
                CallType::WeekendInterventional => summary.weekend_interventional.push(CallSlot {
                    label: call.label.clone(),
                    provider,
                }),
            }
        }
        summary
    }

    pub fn is_empty(&self) -> bool {
        self.weekday_noninvasive.is_empty()
            && self.weekday_interventional.is_empty()
            && self.weekend_noninvasive.is_empty()
            && self.weekend_interventional.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardDay {
    pub date: NaiveDate,
    pub display: String,
    pub am: Vec<ScheduleAssignment>,
    pub pm: Vec<ScheduleAssignment>,
}

/// One working week of site coverage plus the call rows for that calendar week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekBoard {
    pub week_start: NaiveDate,
    pub days: Vec<BoardDay>,
    pub calls: CallSummary,
}

impl WeekBoard {
    /// Build the board for the ISO week containing `week_start`. `None` when that week runs
    /// past the representable calendar.
    pub fn build(
        week_start: NaiveDate,
        schedule: &[ScheduleAssignment],
        calls: &[CallAssignment],
    ) -> Option<Self> {
        let (monday, sunday) = calendar::iso_week_bounds(week_start)?;
        let mut buckets = collate_by_block(schedule);

        let days = working_days(monday)
            .map(|date| BoardDay {
                date,
                display: calendar::format_display(date),
                am: buckets.remove(&(date, SessionBlock::Am)).unwrap_or_default(),
                pm: buckets.remove(&(date, SessionBlock::Pm)).unwrap_or_default(),
            })
            .collect();

        let calls = CallSummary::from_assignments(
            calls
                .iter()
                .filter(|call| calendar::is_within_range(call.date, monday, sunday)),
        );

        Some(Self {
            week_start: monday,
            days,
            calls,
        })
    }
}

/// Monday through Friday starting at `monday`.
pub(crate) fn working_days(monday: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    (0..WORKING_DAYS).filter_map(move |offset| calendar::shift_days(monday, offset))
}

const WORKING_DAYS: i64 = 5;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::roster::SiteKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn shift(day: NaiveDate, block: SessionBlock, site: &str, provider: &str) -> ScheduleAssignment {
        ScheduleAssignment {
            date: day,
            block,
            site: site.to_string(),
            site_type: SiteKind::Office,
            provider_id: provider.to_string(),
            provider_label: None,
            role: None,
        }
    }

    fn call(day: NaiveDate, call_type: CallType, label: &str, provider: &str) -> CallAssignment {
        CallAssignment {
            date: day,
            call_type,
            label: label.to_string(),
            provider_id: provider.to_string(),
            provider_label: None,
        }
    }

    #[test]
    fn buckets_sort_by_site_and_keep_input_order_for_ties() {
        let day = date(2026, 1, 5);
        let buckets = collate_by_block(&[
            shift(day, SessionBlock::Am, "WT HOSP", "APZ"),
            shift(day, SessionBlock::Am, "HH OFFICE", "JOO"),
            shift(day, SessionBlock::Am, "HH OFFICE", "KC"),
            shift(day, SessionBlock::Pm, "HH OFFICE", "JOO"),
        ]);

        let morning: Vec<&str> = buckets[&(day, SessionBlock::Am)]
            .iter()
            .map(|entry| entry.provider_id.as_str())
            .collect();
        assert_eq!(morning, vec!["JOO", "KC", "APZ"]);
        assert_eq!(buckets[&(day, SessionBlock::Pm)].len(), 1);
    }

    #[test]
    fn weekday_calls_overwrite_by_label_and_weekend_calls_accumulate() {
        let calls = [
            call(date(2026, 1, 5), CallType::WeekdayNoninvasive, "Mon", "JOO"),
            call(date(2026, 1, 5), CallType::WeekdayNoninvasive, "Mon", "KC"),
            call(date(2026, 1, 10), CallType::WeekendNoninvasive, "Sat", "APZ"),
            call(date(2026, 1, 11), CallType::WeekendNoninvasive, "Sun", "APZ"),
        ];
        let summary = CallSummary::from_assignments(&calls);

        assert_eq!(summary.weekday_noninvasive.len(), 1);
        assert_eq!(summary.weekday_noninvasive["Mon"], "KC");
        assert_eq!(summary.weekend_noninvasive.len(), 2);
        assert_eq!(summary.weekend_noninvasive[1].label, "Sun");
        assert!(summary.weekday_interventional.is_empty());
    }

    #[test]
    fn week_board_covers_working_days_and_filters_calls_to_the_week() {
        let schedule = [
            shift(date(2026, 1, 7), SessionBlock::Pm, "HH OFFICE", "KC"),
            shift(date(2026, 1, 10), SessionBlock::Am, "WT HOSP", "APZ"),
            shift(date(2026, 1, 12), SessionBlock::Am, "HH OFFICE", "JOO"),
        ];
        let calls = [
            call(date(2026, 1, 11), CallType::WeekendInterventional, "Sun INT", "APZ"),
            call(date(2026, 1, 12), CallType::WeekdayNoninvasive, "Mon", "JOO"),
        ];

        let board = WeekBoard::build(date(2026, 1, 8), &schedule, &calls).expect("week in range");

        assert_eq!(board.week_start, date(2026, 1, 5));
        assert_eq!(board.days.len(), 5);
        assert_eq!(board.days[0].display, "Jan 05");
        assert_eq!(board.days[2].pm.len(), 1);
        assert!(board.days.iter().all(|day| day.date < date(2026, 1, 10)));
        assert_eq!(board.calls.weekend_interventional.len(), 1);
        assert!(board.calls.weekday_noninvasive.is_empty());
    }

    #[test]
    fn week_board_is_none_past_the_last_representable_week() {
        let last = calendar::parse_iso_date("+262142-12-31").expect("last representable day");
        assert_eq!(WeekBoard::build(last, &[], &[]), None);
    }
}
