//! Read-only aggregation over site and call assignments.

pub mod board;
pub mod fairness;
pub mod gaps;

pub use board::{collate_by_block, BoardDay, CallSlot, CallSummary, WeekBoard};
pub use fairness::{hospital_day_deltas, weekend_call_deltas, FairnessRow};
pub use gaps::{coverage_gaps, GapSlot, SiteGaps};
