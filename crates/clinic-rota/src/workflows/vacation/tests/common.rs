use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};

use crate::workflows::roster::{Holiday, SchedulingWindow};
use crate::workflows::store::{FixedClock, StaffingStore};
use crate::workflows::vacation::{
    AllowanceRecord, RequestId, VacationBlock, VacationDraft, VacationRequest,
};

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn window() -> SchedulingWindow {
    SchedulingWindow::new(date(2026, 1, 5), date(2026, 3, 27)).expect("valid window")
}

pub(super) fn mlk_day() -> Holiday {
    Holiday {
        date: date(2026, 1, 19),
        name: "MLK Day".to_string(),
        is_office_closed: true,
        extend_weekend: true,
    }
}

pub(super) fn allowance(provider: &str, days_total: f64, quota: Option<f64>) -> AllowanceRecord {
    AllowanceRecord {
        provider_id: provider.to_string(),
        year: 2026,
        days_total,
        days_used: 0.0,
        am_quota: quota,
        pm_quota: quota,
        am_used: 0.0,
        pm_used: 0.0,
    }
}

/// Store with the Q1 2026 window, MLK Day closed and JOO on `{20, 0, 10, 10}`.
pub(super) fn configured_store() -> StaffingStore {
    let clock = Utc
        .with_ymd_and_hms(2026, 1, 2, 8, 30, 0)
        .single()
        .expect("valid timestamp");
    let mut store = StaffingStore::with_clock(Arc::new(FixedClock(clock)));
    store.set_window(window());
    store.set_holidays(vec![mlk_day()]);
    store.set_allowances(vec![allowance("JOO", 20.0, Some(10.0))]);
    store
}

pub(super) fn draft(block: VacationBlock, start: NaiveDate, end: NaiveDate) -> VacationDraft {
    VacationDraft::new("JOO", block, start, end)
}

/// Create and submit a request, returning its id.
pub(super) fn submitted(store: &mut StaffingStore, draft: VacationDraft) -> RequestId {
    let created = store.create_vacation_draft(draft).expect("draft created");
    store
        .submit_vacation_request(&created.id, "JOO")
        .expect("draft submitted");
    created.id
}

pub(super) fn approved(store: &mut StaffingStore, draft: VacationDraft) -> VacationRequest {
    let id = submitted(store, draft);
    store
        .approve_vacation_request(&id, "chief")
        .expect("request approved")
}
