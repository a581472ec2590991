use chrono::NaiveDate;

use super::domain::{VacationBlock, VacationDraft};
use super::impact::SpanViolation;
use crate::calendar;
use crate::workflows::roster::{HolidayCalendar, SchedulingWindow};

/// Reasons a draft is rejected before it is recorded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyViolation {
    #[error("scheduling window not configured")]
    WindowNotConfigured,
    #[error("{date} falls outside the active window {window_start}..{window_end}")]
    OutOfWindow {
        date: NaiveDate,
        window_start: NaiveDate,
        window_end: NaiveDate,
    },
    #[error(transparent)]
    Span(#[from] SpanViolation),
    #[error("request intersects office closure holiday {name} on {date}")]
    HolidayConflict { date: NaiveDate, name: String },
    #[error("{block} requests must fall on weekdays ({date} is a weekend)")]
    WeekendNotAllowed { block: VacationBlock, date: NaiveDate },
}

/// Check a draft against the window and holiday calendar.
///
/// Checks run in a fixed order: window membership, span orientation, office closures,
/// then weekday-only blocks.
pub(crate) fn validate_draft(
    draft: &VacationDraft,
    window: Option<&SchedulingWindow>,
    holidays: &HolidayCalendar,
) -> Result<(), PolicyViolation> {
    let window = window.ok_or(PolicyViolation::WindowNotConfigured)?;
    for date in [draft.start_date, draft.end_date] {
        if !window.contains(date) {
            return Err(PolicyViolation::OutOfWindow {
                date,
                window_start: window.start(),
                window_end: window.end(),
            });
        }
    }

    if draft.end_date < draft.start_date {
        return Err(SpanViolation::EndBeforeStart {
            start: draft.start_date,
            end: draft.end_date,
        }
        .into());
    }

    if let Some(holiday) = holidays.office_closure_within(draft.start_date, draft.end_date) {
        return Err(PolicyViolation::HolidayConflict {
            date: holiday.date,
            name: holiday.name.clone(),
        });
    }

    if draft.block.requires_weekdays() {
        if let Some(date) = [draft.start_date, draft.end_date]
            .into_iter()
            .find(|date| calendar::is_weekend(*date))
        {
            return Err(PolicyViolation::WeekendNotAllowed {
                block: draft.block,
                date,
            });
        }
    }

    Ok(())
}
