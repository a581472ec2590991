//! Reference data for the staffing roster: providers, the scheduling window, holidays,
//! site/call assignments and fairness targets.

pub mod domain;
mod holidays;
pub mod import;

pub use domain::{
    CallAssignment, CallType, FairnessTargets, Holiday, Provider, ScheduleAssignment,
    SchedulingWindow, SessionBlock, SiteKind,
};
pub use holidays::HolidayCalendar;
pub use import::{RosterImportError, RosterImporter};
