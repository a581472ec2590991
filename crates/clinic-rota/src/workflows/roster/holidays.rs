use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::domain::Holiday;
use crate::calendar;

/// Holidays keyed by date; a later entry for the same date replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    by_date: BTreeMap<NaiveDate, Holiday>,
}

impl HolidayCalendar {
    pub fn from_holidays(holidays: impl IntoIterator<Item = Holiday>) -> Self {
        let by_date = holidays
            .into_iter()
            .map(|holiday| (holiday.date, holiday))
            .collect();
        Self { by_date }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&Holiday> {
        self.by_date.get(&date)
    }

    /// First office closure falling on a weekday of the inclusive span.
    pub fn office_closure_within(&self, start: NaiveDate, end: NaiveDate) -> Option<&Holiday> {
        if end < start {
            return None;
        }
        self.by_date
            .range(start..=end)
            .map(|(_, holiday)| holiday)
            .find(|holiday| holiday.is_office_closed && calendar::is_weekday(holiday.date))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Holiday> {
        self.by_date.values()
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}
