//! Authoritative in-memory scheduling state.
//!
//! [`StaffingStore`] owns the roster, the allowance ledger and every vacation request. All
//! mutations run synchronously: validation first, then the state change, then a snapshot
//! fan-out to subscribers. A failed operation leaves state untouched and notifies nobody.

mod clock;
mod configuration;
mod error;
mod listeners;
pub mod router;
mod snapshot;

use std::sync::{Arc, Mutex};

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info, warn};

use crate::calendar;
use crate::workflows::coverage::{self, board, FairnessRow, SiteGaps, WeekBoard};
use crate::workflows::intake::IntakeError;
use crate::workflows::roster::{
    CallAssignment, FairnessTargets, Holiday, HolidayCalendar, Provider, ScheduleAssignment,
    SchedulingWindow,
};
use crate::workflows::vacation::domain::DEFAULT_ACTOR;
use crate::workflows::vacation::{
    compute_impact, policy, AllowanceLedger, AllowanceRecord, AuditAction, AuditEntry,
    LedgerDirection, PolicyViolation, RequestId, RequestMetadata, VacationDraft,
    VacationRequest, VacationStatus,
};

pub use clock::{Clock, FixedClock, SystemClock};
pub use configuration::StoreConfiguration;
pub use error::{ErrorKind, StoreError};
pub use listeners::{Listener, Subscription};
pub use router::{store_router, SharedStore};
pub use snapshot::{AllowanceOverviewRow, StoreSnapshot};

pub struct StaffingStore {
    window: Option<SchedulingWindow>,
    providers: Vec<Provider>,
    holidays: HolidayCalendar,
    ledger: AllowanceLedger,
    vacations: Vec<VacationRequest>,
    targets: FairnessTargets,
    schedule: Vec<ScheduleAssignment>,
    calls: Vec<CallAssignment>,
    sequence: u64,
    listeners: listeners::SharedRegistry,
    clock: Arc<dyn Clock>,
}

impl Default for StaffingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StaffingStore {
    /// Empty store: no window, no roster, no requests.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            window: None,
            providers: Vec::new(),
            holidays: HolidayCalendar::default(),
            ledger: AllowanceLedger::default(),
            vacations: Vec::new(),
            targets: FairnessTargets::default(),
            schedule: Vec::new(),
            calls: Vec::new(),
            sequence: 0,
            listeners: Arc::new(Mutex::new(Default::default())),
            clock,
        }
    }

    pub fn with_configuration(configuration: StoreConfiguration) -> Result<Self, StoreError> {
        let mut store = Self::new();
        store.apply_configuration(configuration)?;
        Ok(store)
    }

    /// Replace every part present in `configuration`. Nothing changes if any part is malformed.
    pub fn apply_configuration(
        &mut self,
        configuration: StoreConfiguration,
    ) -> Result<(), StoreError> {
        let parts = configuration.normalize().map_err(|err| {
            warn!(error = %err, "configuration rejected");
            StoreError::from(err)
        })?;

        if let Some(window) = parts.window {
            self.window = Some(window);
        }
        if let Some(providers) = parts.providers {
            self.providers = providers;
        }
        if let Some(holidays) = parts.holidays {
            self.holidays = HolidayCalendar::from_holidays(holidays);
        }
        if let Some(allowances) = parts.allowances {
            self.ledger = AllowanceLedger::from_records(allowances);
        }
        if let Some(schedule) = parts.schedule {
            self.schedule = schedule;
        }
        if let Some(calls) = parts.call_assignments {
            self.calls = calls;
        }
        if let Some(targets) = parts.fairness_targets {
            self.targets = targets;
        }

        debug!(
            providers = self.providers.len(),
            holidays = self.holidays.len(),
            schedule = self.schedule.len(),
            calls = self.calls.len(),
            "configuration applied"
        );
        self.notify();
        Ok(())
    }

    pub fn set_window(&mut self, window: SchedulingWindow) {
        debug!(start = %window.start(), end = %window.end(), "scheduling window replaced");
        self.window = Some(window);
        self.notify();
    }

    pub fn set_providers(&mut self, providers: Vec<Provider>) {
        debug!(count = providers.len(), "providers replaced");
        self.providers = providers;
        self.notify();
    }

    pub fn set_holidays(&mut self, holidays: Vec<Holiday>) {
        self.holidays = HolidayCalendar::from_holidays(holidays);
        debug!(count = self.holidays.len(), "holidays replaced");
        self.notify();
    }

    pub fn set_allowances(&mut self, allowances: Vec<AllowanceRecord>) {
        debug!(count = allowances.len(), "allowances replaced");
        self.ledger = AllowanceLedger::from_records(allowances);
        self.notify();
    }

    pub fn set_schedule(&mut self, schedule: Vec<ScheduleAssignment>) {
        debug!(count = schedule.len(), "schedule assignments replaced");
        self.schedule = schedule;
        self.notify();
    }

    pub fn set_call_assignments(&mut self, calls: Vec<CallAssignment>) {
        debug!(count = calls.len(), "call assignments replaced");
        self.calls = calls;
        self.notify();
    }

    pub fn set_fairness_targets(&mut self, targets: FairnessTargets) {
        debug!(
            weekend_call = targets.weekend_call.len(),
            hospital_days = targets.hospital_days.len(),
            "fairness targets replaced"
        );
        self.targets = targets;
        self.notify();
    }

    /// Validate and record a new `DRAFT` request.
    pub fn create_vacation_draft(
        &mut self,
        draft: VacationDraft,
    ) -> Result<VacationRequest, StoreError> {
        if let Err(violation) = policy::validate_draft(&draft, self.window.as_ref(), &self.holidays)
        {
            let error = StoreError::from(violation);
            warn!(
                provider = %draft.provider_id,
                kind = error.kind().label(),
                error = %error,
                "vacation draft rejected"
            );
            return Err(error);
        }

        self.sequence += 1;
        let actor = if draft.actor.trim().is_empty() {
            DEFAULT_ACTOR.to_string()
        } else {
            draft.actor
        };
        let request = VacationRequest {
            id: RequestId::from_sequence(self.sequence),
            provider_id: draft.provider_id,
            start_date: draft.start_date,
            end_date: draft.end_date,
            block: draft.block,
            status: VacationStatus::Draft,
            approver_id: None,
            audit_log: vec![AuditEntry {
                timestamp: self.clock.now(),
                action: AuditAction::Create,
                actor: actor.clone(),
                notes: draft.notes.clone(),
            }],
            metadata: RequestMetadata {
                notes: draft.notes,
                created_by: actor,
            },
        };
        self.vacations.push(request.clone());

        self.committed("create", &request);
        Ok(request)
    }

    pub fn submit_vacation_request(
        &mut self,
        id: &RequestId,
        actor: &str,
    ) -> Result<VacationRequest, StoreError> {
        let result = self.transition(id, VacationStatus::Submitted, actor, "", None);
        self.conclude("submit", id, result)
    }

    /// Approve a submitted request and draw its impact from the provider's allowance for the
    /// year of the start date.
    pub fn approve_vacation_request(
        &mut self,
        id: &RequestId,
        approver: &str,
    ) -> Result<VacationRequest, StoreError> {
        let result = self.transition(id, VacationStatus::Approved, approver, "", Some(approver));
        self.conclude("approve", id, result)
    }

    pub fn deny_vacation_request(
        &mut self,
        id: &RequestId,
        approver: &str,
        notes: &str,
    ) -> Result<VacationRequest, StoreError> {
        let result = self.transition(id, VacationStatus::Denied, approver, notes, Some(approver));
        self.conclude("deny", id, result)
    }

    fn transition(
        &mut self,
        id: &RequestId,
        next: VacationStatus,
        actor: &str,
        notes: &str,
        approver: Option<&str>,
    ) -> Result<VacationRequest, StoreError> {
        let index = self
            .vacations
            .iter()
            .position(|request| &request.id == id)
            .ok_or_else(|| StoreError::UnknownRequest(id.clone()))?;
        let request = &self.vacations[index];
        if !request.status.can_transition_to(next) {
            return Err(StoreError::InvalidTransition {
                id: id.clone(),
                from: request.status,
                to: next,
            });
        }

        if next == VacationStatus::Approved {
            let impact = compute_impact(request.block, request.start_date, request.end_date)?;
            let year = request.start_date.year();
            self.ledger
                .apply(&request.provider_id, year, &impact, LedgerDirection::Apply)?;
        }

        let timestamp = self.clock.now();
        let request = &mut self.vacations[index];
        request.status = next;
        if let Some(approver) = approver {
            request.approver_id = Some(approver.to_string());
        }
        request.audit_log.push(AuditEntry {
            timestamp,
            action: AuditAction::from(next),
            actor: actor.to_string(),
            notes: notes.to_string(),
        });
        Ok(request.clone())
    }

    fn conclude(
        &self,
        operation: &'static str,
        id: &RequestId,
        result: Result<VacationRequest, StoreError>,
    ) -> Result<VacationRequest, StoreError> {
        match &result {
            Ok(request) => self.committed(operation, request),
            Err(error) => warn!(
                operation,
                request_id = %id,
                kind = error.kind().label(),
                error = %error,
                "vacation transition rejected"
            ),
        }
        result
    }

    fn committed(&self, operation: &'static str, request: &VacationRequest) {
        info!(
            operation,
            request_id = %request.id,
            provider = %request.provider_id,
            status = %request.status,
            "vacation request updated"
        );
        self.notify();
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&StoreSnapshot) + Send + Sync + 'static,
    {
        listeners::register(&self.listeners, Arc::new(listener))
    }

    pub fn listener_count(&self) -> usize {
        listeners::listener_count(&self.listeners)
    }

    fn notify(&self) {
        if self.listener_count() == 0 {
            return;
        }
        let delivered = listeners::broadcast(&self.listeners, &self.get_state());
        debug!(listeners = delivered, "state change broadcast");
    }

    /// Deep copy of the current state.
    pub fn get_state(&self) -> StoreSnapshot {
        StoreSnapshot {
            window: self.window,
            providers: self.providers.clone(),
            holidays: self.holidays.iter().cloned().collect(),
            allowances: self.ledger.records().clone(),
            vacations: self.vacations.clone(),
            fairness_targets: self.targets.clone(),
            schedule_assignments: self.schedule.clone(),
            call_assignments: self.calls.clone(),
        }
    }

    pub fn window(&self) -> Option<&SchedulingWindow> {
        self.window.as_ref()
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn vacations(&self) -> &[VacationRequest] {
        &self.vacations
    }

    /// Year of the window start, used when a listing is not given one.
    pub fn active_year(&self) -> Option<i32> {
        self.window.map(|window| window.active_year())
    }

    pub fn vacation(&self, id: &RequestId) -> Result<VacationRequest, StoreError> {
        self.vacations
            .iter()
            .find(|request| &request.id == id)
            .cloned()
            .ok_or_else(|| StoreError::UnknownRequest(id.clone()))
    }

    pub fn allowance_summary(
        &self,
        provider_id: &str,
        year: i32,
    ) -> Result<AllowanceRecord, StoreError> {
        Ok(self.ledger.locate(provider_id, year)?.clone())
    }

    /// One row per roster provider, in roster order.
    pub fn allowance_overview(&self, year: i32) -> Vec<AllowanceOverviewRow> {
        self.providers
            .iter()
            .map(|provider| AllowanceOverviewRow {
                provider: provider.clone(),
                allowance: self.ledger.locate(&provider.id, year).ok().cloned(),
            })
            .collect()
    }

    pub fn weekend_call_deltas(&self) -> Vec<FairnessRow> {
        coverage::weekend_call_deltas(&self.calls, &self.targets)
    }

    pub fn hospital_day_deltas(&self) -> Vec<FairnessRow> {
        coverage::hospital_day_deltas(&self.schedule, &self.targets)
    }

    /// Board for the week containing `week_start`, or the first week of the window.
    pub fn week_board(&self, week_start: Option<NaiveDate>) -> Result<WeekBoard, StoreError> {
        let week_start = self.anchor_week(week_start)?;
        WeekBoard::build(week_start, &self.schedule, &self.calls)
            .ok_or_else(|| unrepresentable_week(week_start))
    }

    /// Unstaffed site sessions on open weekdays, for the week containing `week_start` or
    /// across the whole window. Office-closed holidays need no coverage.
    pub fn coverage_gaps(
        &self,
        week_start: Option<NaiveDate>,
    ) -> Result<Vec<SiteGaps>, StoreError> {
        let days = match (week_start, self.window) {
            (Some(date), _) => {
                let (monday, _) =
                    calendar::iso_week_bounds(date).ok_or_else(|| unrepresentable_week(date))?;
                board::working_days(monday).collect()
            }
            (None, Some(window)) => calendar::weekdays_between(window.start(), window.end()),
            (None, None) => return Err(PolicyViolation::WindowNotConfigured.into()),
        };
        let open: Vec<NaiveDate> = days
            .into_iter()
            .filter(|day| {
                !self
                    .holidays
                    .get(*day)
                    .is_some_and(|holiday| holiday.is_office_closed)
            })
            .collect();
        Ok(coverage::coverage_gaps(&self.schedule, &open))
    }

    fn anchor_week(&self, week_start: Option<NaiveDate>) -> Result<NaiveDate, StoreError> {
        match (week_start, self.window) {
            (Some(date), _) => Ok(date),
            (None, Some(window)) => Ok(window.start()),
            (None, None) => Err(PolicyViolation::WindowNotConfigured.into()),
        }
    }
}

fn unrepresentable_week(date: NaiveDate) -> StoreError {
    IntakeError::InvalidDate {
        field: "week_start",
        value: calendar::to_iso_date(date),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::vacation::VacationBlock;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn store() -> StaffingStore {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 2, 9, 0, 0).unwrap());
        let mut store = StaffingStore::with_clock(Arc::new(clock));
        store.set_window(SchedulingWindow::new(date(2026, 1, 5), date(2026, 3, 27)).expect("window"));
        store
    }

    #[test]
    fn sequence_only_advances_on_success() {
        let mut store = store();
        let rejected = VacationDraft::new("JOO", VacationBlock::Am, date(2026, 1, 10), date(2026, 1, 10));
        assert!(store.create_vacation_draft(rejected).is_err());

        let first = store
            .create_vacation_draft(VacationDraft::new(
                "JOO",
                VacationBlock::Pm,
                date(2026, 1, 7),
                date(2026, 1, 7),
            ))
            .expect("draft created");
        assert_eq!(first.id.as_str(), "VR-00001");
        assert_eq!(first.audit_log[0].action, AuditAction::Create);
        assert_eq!(first.metadata.created_by, "user");
    }

    #[test]
    fn week_board_requires_a_window_or_explicit_week() {
        let empty = StaffingStore::new();
        assert_eq!(
            empty.week_board(None).map(|_| ()),
            Err(StoreError::Policy(PolicyViolation::WindowNotConfigured))
        );
        assert!(empty.week_board(Some(date(2026, 1, 7))).is_ok());
        assert_eq!(
            store().week_board(None).expect("board").week_start,
            date(2026, 1, 5)
        );
    }

    #[test]
    fn weeks_past_the_calendar_edge_are_rejected_as_malformed() {
        let store = store();
        let last = calendar::parse_iso_date("+262142-12-31").expect("last representable day");

        match store.week_board(Some(last)) {
            Err(StoreError::Malformed(IntakeError::InvalidDate { field, .. })) => {
                assert_eq!(field, "week_start")
            }
            other => panic!("expected invalid week_start, got {other:?}"),
        }
        assert_eq!(
            store.coverage_gaps(Some(last)).map(|gaps| gaps.len()),
            Err(StoreError::Malformed(IntakeError::InvalidDate {
                field: "week_start",
                value: "+262142-12-31".to_string(),
            }))
        );
        let error = store.week_board(Some(last)).map(|_| ()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn coverage_gaps_skip_office_closures() {
        let mut store = store();
        store.set_holidays(vec![Holiday {
            date: date(2026, 1, 19),
            name: "MLK Day".to_string(),
            is_office_closed: true,
            extend_weekend: false,
        }]);
        store.set_schedule(vec![ScheduleAssignment {
            date: date(2026, 1, 20),
            block: crate::workflows::roster::SessionBlock::Am,
            site: "RMC".to_string(),
            site_type: crate::workflows::roster::SiteKind::Hospital,
            provider_id: "JOO".to_string(),
            provider_label: None,
            role: None,
        }]);

        let week = store.coverage_gaps(Some(date(2026, 1, 21))).expect("gaps");
        assert_eq!(week.len(), 1);
        assert_eq!(week[0].site, "RMC");
        // Tue PM plus Wed..Fri; Monday is closed.
        assert_eq!(week[0].gaps.len(), 7);
        assert!(week[0].gaps.iter().all(|slot| slot.date != date(2026, 1, 19)));

        assert!(StaffingStore::new().coverage_gaps(None).is_err());
    }

    #[test]
    fn setters_notify_every_listener() {
        let store_calls = Arc::new(AtomicUsize::new(0));
        let mut store = store();
        let counter = Arc::clone(&store_calls);
        let _subscription = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.set_providers(Vec::new());
        store.set_fairness_targets(FairnessTargets::default());
        assert_eq!(store_calls.load(Ordering::SeqCst), 2);
    }
}
