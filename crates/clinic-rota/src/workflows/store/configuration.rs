use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::workflows::intake::{
    AllowancePayload, CallAssignmentPayload, FairnessTargetsPayload, HolidayPayload,
    IntakeError, ProviderPayload, ScheduleAssignmentPayload, WindowPayload,
};
use crate::workflows::roster::{
    CallAssignment, FairnessTargets, Holiday, Provider, ScheduleAssignment, SchedulingWindow,
};
use crate::workflows::vacation::AllowanceRecord;

/// Bulk configuration payload. Every part is optional; absent parts leave the store as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfiguration {
    #[serde(default)]
    pub window: Option<WindowPayload>,
    #[serde(default)]
    pub providers: Option<Vec<ProviderPayload>>,
    #[serde(default)]
    pub holidays: Option<Vec<HolidayPayload>>,
    #[serde(default)]
    pub allowances: Option<Vec<AllowancePayload>>,
    #[serde(default, alias = "scheduleAssignments", alias = "schedule_assignments")]
    pub schedule: Option<Vec<ScheduleAssignmentPayload>>,
    #[serde(default, alias = "callAssignments", alias = "calls")]
    pub call_assignments: Option<Vec<CallAssignmentPayload>>,
    #[serde(default, alias = "fairnessTargets")]
    pub fairness_targets: Option<FairnessTargetsPayload>,
}

impl StoreConfiguration {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    /// Normalize every present part, failing on the first malformed record.
    pub(crate) fn normalize(self) -> Result<NormalizedConfiguration, IntakeError> {
        Ok(NormalizedConfiguration {
            window: self.window.map(WindowPayload::normalize).transpose()?,
            providers: normalize_all(self.providers, ProviderPayload::normalize)?,
            holidays: normalize_all(self.holidays, HolidayPayload::normalize)?,
            allowances: normalize_all(self.allowances, AllowancePayload::normalize)?,
            schedule: normalize_all(self.schedule, ScheduleAssignmentPayload::normalize)?,
            call_assignments: normalize_all(
                self.call_assignments,
                CallAssignmentPayload::normalize,
            )?,
            fairness_targets: self.fairness_targets.map(FairnessTargetsPayload::normalize),
        })
    }
}

pub(crate) struct NormalizedConfiguration {
    pub(crate) window: Option<SchedulingWindow>,
    pub(crate) providers: Option<Vec<Provider>>,
    pub(crate) holidays: Option<Vec<Holiday>>,
    pub(crate) allowances: Option<Vec<AllowanceRecord>>,
    pub(crate) schedule: Option<Vec<ScheduleAssignment>>,
    pub(crate) call_assignments: Option<Vec<CallAssignment>>,
    pub(crate) fairness_targets: Option<FairnessTargets>,
}

fn normalize_all<P, T>(
    payloads: Option<Vec<P>>,
    normalize: fn(P) -> Result<T, IntakeError>,
) -> Result<Option<Vec<T>>, IntakeError> {
    payloads
        .map(|items| items.into_iter().map(normalize).collect())
        .transpose()
}
