use std::collections::BTreeMap;

use serde::Serialize;

use crate::workflows::roster::{
    CallAssignment, FairnessTargets, Holiday, Provider, ScheduleAssignment, SchedulingWindow,
};
use crate::workflows::vacation::{AllowanceRecord, VacationRequest};

/// Owned copy of the full store state handed to listeners and callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSnapshot {
    pub window: Option<SchedulingWindow>,
    pub providers: Vec<Provider>,
    pub holidays: Vec<Holiday>,
    pub allowances: BTreeMap<String, BTreeMap<i32, AllowanceRecord>>,
    pub vacations: Vec<VacationRequest>,
    pub fairness_targets: FairnessTargets,
    pub schedule_assignments: Vec<ScheduleAssignment>,
    pub call_assignments: Vec<CallAssignment>,
}

/// One row of the per-year allowance listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllowanceOverviewRow {
    pub provider: Provider,
    pub allowance: Option<AllowanceRecord>,
}
