use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar;

/// Roster entry for a clinician who can be scheduled or request time off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub initials: String,
    pub full_name: Option<String>,
    /// Free-form role tag such as `MD` or `APN`.
    pub role: Option<String>,
}

impl Provider {
    pub fn display_label(&self) -> &str {
        if !self.initials.is_empty() {
            &self.initials
        } else if let Some(name) = self.full_name.as_deref().filter(|name| !name.is_empty()) {
            name
        } else {
            &self.id
        }
    }
}

/// Inclusive date range every request and assignment is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchedulingWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl SchedulingWindow {
    /// Returns `None` when `start` falls after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        calendar::is_within_range(date, self.start, self.end)
    }

    /// Allowance year assumed by listings that are not given one explicitly.
    pub fn active_year(&self) -> i32 {
        self.start.year()
    }

    pub fn weeks(&self) -> Vec<NaiveDate> {
        calendar::enumerate_weeks(self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
    pub is_office_closed: bool,
    pub extend_weekend: bool,
}

/// Half-day session a site assignment covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SessionBlock {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl SessionBlock {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Am => "AM",
            Self::Pm => "PM",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "AM" => Some(Self::Am),
            "PM" => Some(Self::Pm),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteKind {
    Hospital,
    Office,
    Unspecified,
    Other(String),
}

impl SiteKind {
    pub fn from_label(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "hospital" => Self::Hospital,
            "office" => Self::Office,
            "" => Self::Unspecified,
            _ => Self::Other(normalized),
        }
    }

    pub fn is_hospital(&self) -> bool {
        matches!(self, Self::Hospital)
    }
}

/// A provider staffing a site for one session of one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleAssignment {
    pub date: NaiveDate,
    pub block: SessionBlock,
    pub site: String,
    pub site_type: SiteKind,
    pub provider_id: String,
    pub provider_label: Option<String>,
    pub role: Option<String>,
}

impl ScheduleAssignment {
    pub fn display_provider(&self) -> &str {
        self.provider_label.as_deref().unwrap_or(&self.provider_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    WeekdayNoninvasive,
    WeekdayInterventional,
    WeekendNoninvasive,
    WeekendInterventional,
}

impl CallType {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::WeekdayNoninvasive,
            Self::WeekdayInterventional,
            Self::WeekendNoninvasive,
            Self::WeekendInterventional,
        ]
    }

    pub const fn tag(self) -> &'static str {
        match self {
            Self::WeekdayNoninvasive => "weekday_noninvasive",
            Self::WeekdayInterventional => "weekday_interventional",
            Self::WeekendNoninvasive => "weekend_noninvasive",
            Self::WeekendInterventional => "weekend_interventional",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::WeekdayNoninvasive => "Weekday Noninvasive",
            Self::WeekdayInterventional => "Weekday Interventional",
            Self::WeekendNoninvasive => "Weekend Noninvasive",
            Self::WeekendInterventional => "Weekend Interventional",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|call_type| call_type.tag() == normalized)
    }

    pub const fn is_weekend(self) -> bool {
        matches!(
            self,
            Self::WeekendNoninvasive | Self::WeekendInterventional
        )
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallAssignment {
    pub date: NaiveDate,
    pub call_type: CallType,
    /// Row label shown in call summaries (`Mon`, `Sat INT`, ...).
    pub label: String,
    pub provider_id: String,
    pub provider_label: Option<String>,
}

impl CallAssignment {
    pub fn display_provider(&self) -> &str {
        self.provider_label.as_deref().unwrap_or(&self.provider_id)
    }
}

/// Per-provider burden targets compared against actual assignments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FairnessTargets {
    pub weekend_call: BTreeMap<String, f64>,
    pub hospital_days: BTreeMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn window_rejects_inverted_range() {
        assert!(SchedulingWindow::new(date(2026, 3, 27), date(2026, 1, 5)).is_none());
        let window = SchedulingWindow::new(date(2026, 1, 5), date(2026, 3, 27)).expect("window");
        assert!(window.contains(date(2026, 1, 5)));
        assert!(!window.contains(date(2026, 3, 28)));
        assert_eq!(window.active_year(), 2026);
        assert_eq!(window.weeks().len(), 12);
    }

    #[test]
    fn provider_label_prefers_initials() {
        let mut provider = Provider {
            id: "p-1".to_string(),
            initials: String::new(),
            full_name: Some("Kara Chen".to_string()),
            role: Some("APN".to_string()),
        };
        assert_eq!(provider.display_label(), "Kara Chen");
        provider.initials = "KC".to_string();
        assert_eq!(provider.display_label(), "KC");
        provider.initials.clear();
        provider.full_name = None;
        assert_eq!(provider.display_label(), "p-1");
    }

    #[test]
    fn call_type_parses_tags() {
        assert_eq!(
            CallType::parse(" Weekend_Interventional "),
            Some(CallType::WeekendInterventional)
        );
        assert_eq!(CallType::parse("overnight"), None);
        assert!(CallType::WeekendNoninvasive.is_weekend());
        assert!(!CallType::WeekdayNoninvasive.is_weekend());
    }

    #[test]
    fn site_kind_normalizes_labels() {
        assert_eq!(SiteKind::from_label("Hospital"), SiteKind::Hospital);
        assert_eq!(SiteKind::from_label(""), SiteKind::Unspecified);
        assert_eq!(
            SiteKind::from_label("Cath Lab"),
            SiteKind::Other("cath lab".to_string())
        );
    }
}
