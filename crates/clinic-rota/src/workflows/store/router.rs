use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::{ErrorKind, StaffingStore, StoreError};
use crate::calendar;
use crate::workflows::intake::{
    AllowancePayload, CallAssignmentPayload, DraftPayload, FairnessTargetsPayload,
    HolidayPayload, IntakeError, ProviderPayload, ScheduleAssignmentPayload, WindowPayload,
};
use crate::workflows::vacation::domain::DEFAULT_ACTOR;
use crate::workflows::vacation::{PolicyViolation, RequestId};

/// Store handle shared by request handlers. Handlers never hold the lock across an await.
pub type SharedStore = Arc<Mutex<StaffingStore>>;

/// JSON endpoints over a shared [`StaffingStore`].
pub fn store_router(store: SharedStore) -> Router {
    Router::new()
        .route("/api/v1/state", get(state_handler))
        .route("/api/v1/config/window", put(window_handler))
        .route("/api/v1/config/providers", put(providers_handler))
        .route("/api/v1/config/holidays", put(holidays_handler))
        .route("/api/v1/config/allowances", put(allowances_handler))
        .route("/api/v1/config/schedule", put(schedule_handler))
        .route("/api/v1/config/calls", put(calls_handler))
        .route("/api/v1/config/fairness-targets", put(targets_handler))
        .route("/api/v1/vacations", post(create_vacation_handler))
        .route("/api/v1/vacations/:request_id", get(vacation_handler))
        .route("/api/v1/vacations/:request_id/submit", post(submit_handler))
        .route("/api/v1/vacations/:request_id/approve", post(approve_handler))
        .route("/api/v1/vacations/:request_id/deny", post(deny_handler))
        .route("/api/v1/allowances", get(allowance_overview_handler))
        .route(
            "/api/v1/allowances/:provider_id/:year",
            get(allowance_summary_handler),
        )
        .route("/api/v1/fairness", get(fairness_handler))
        .route("/api/v1/board", get(board_handler))
        .route("/api/v1/coverage", get(coverage_handler))
        .with_state(store)
}

fn lock(store: &SharedStore) -> MutexGuard<'_, StaffingStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

fn malformed(rejection: JsonRejection) -> Response {
    let payload = json!({
        "error": rejection.body_text(),
        "kind": ErrorKind::MalformedInput.label(),
    });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

fn each<P, T>(
    normalize: fn(P) -> Result<T, IntakeError>,
) -> impl FnOnce(Vec<P>) -> Result<Vec<T>, IntakeError> {
    move |items| items.into_iter().map(normalize).collect()
}

/// Normalize a configuration body and hand it to one of the store's replace operations.
fn replace<P, T>(
    store: &SharedStore,
    payload: Result<Json<P>, JsonRejection>,
    normalize: impl FnOnce(P) -> Result<T, IntakeError>,
    apply: impl FnOnce(&mut StaffingStore, T),
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed(rejection),
    };
    match normalize(payload) {
        Ok(value) => {
            let mut guard = lock(store);
            apply(&mut *guard, value);
            (StatusCode::OK, Json(guard.get_state())).into_response()
        }
        Err(error) => StoreError::from(error).into_response(),
    }
}

async fn state_handler(State(store): State<SharedStore>) -> Response {
    let snapshot = lock(&store).get_state();
    (StatusCode::OK, Json(snapshot)).into_response()
}

async fn window_handler(
    State(store): State<SharedStore>,
    payload: Result<Json<WindowPayload>, JsonRejection>,
) -> Response {
    replace(
        &store,
        payload,
        WindowPayload::normalize,
        StaffingStore::set_window,
    )
}

async fn providers_handler(
    State(store): State<SharedStore>,
    payload: Result<Json<Vec<ProviderPayload>>, JsonRejection>,
) -> Response {
    replace(
        &store,
        payload,
        each(ProviderPayload::normalize),
        StaffingStore::set_providers,
    )
}

async fn holidays_handler(
    State(store): State<SharedStore>,
    payload: Result<Json<Vec<HolidayPayload>>, JsonRejection>,
) -> Response {
    replace(
        &store,
        payload,
        each(HolidayPayload::normalize),
        StaffingStore::set_holidays,
    )
}

async fn allowances_handler(
    State(store): State<SharedStore>,
    payload: Result<Json<Vec<AllowancePayload>>, JsonRejection>,
) -> Response {
    replace(
        &store,
        payload,
        each(AllowancePayload::normalize),
        StaffingStore::set_allowances,
    )
}

async fn schedule_handler(
    State(store): State<SharedStore>,
    payload: Result<Json<Vec<ScheduleAssignmentPayload>>, JsonRejection>,
) -> Response {
    replace(
        &store,
        payload,
        each(ScheduleAssignmentPayload::normalize),
        StaffingStore::set_schedule,
    )
}

async fn calls_handler(
    State(store): State<SharedStore>,
    payload: Result<Json<Vec<CallAssignmentPayload>>, JsonRejection>,
) -> Response {
    replace(
        &store,
        payload,
        each(CallAssignmentPayload::normalize),
        StaffingStore::set_call_assignments,
    )
}

async fn targets_handler(
    State(store): State<SharedStore>,
    payload: Result<Json<FairnessTargetsPayload>, JsonRejection>,
) -> Response {
    replace(
        &store,
        payload,
        |targets: FairnessTargetsPayload| Ok(targets.normalize()),
        StaffingStore::set_fairness_targets,
    )
}

async fn create_vacation_handler(
    State(store): State<SharedStore>,
    payload: Result<Json<DraftPayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed(rejection),
    };
    let draft = match payload.normalize() {
        Ok(draft) => draft,
        Err(error) => return StoreError::from(error).into_response(),
    };
    let result = lock(&store).create_vacation_draft(draft);
    match result {
        Ok(request) => (StatusCode::CREATED, Json(request)).into_response(),
        Err(error) => error.into_response(),
    }
}

async fn vacation_handler(
    State(store): State<SharedStore>,
    Path(request_id): Path<String>,
) -> Response {
    let result = lock(&store).vacation(&RequestId(request_id));
    match result {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(error) => error.into_response(),
    }
}

/// Body shared by the transition endpoints. Every field is optional.
#[derive(Debug, Default, Deserialize)]
struct TransitionBody {
    #[serde(default, alias = "approver", alias = "approverId", alias = "approver_id")]
    actor: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

impl TransitionBody {
    fn actor(&self) -> &str {
        self.actor
            .as_deref()
            .map(str::trim)
            .filter(|actor| !actor.is_empty())
            .unwrap_or(DEFAULT_ACTOR)
    }
}

fn transition_body(payload: Result<Json<TransitionBody>, JsonRejection>) -> Result<TransitionBody, Response> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(TransitionBody::default()),
        Err(rejection) => Err(malformed(rejection)),
    }
}

async fn submit_handler(
    State(store): State<SharedStore>,
    Path(request_id): Path<String>,
    payload: Result<Json<TransitionBody>, JsonRejection>,
) -> Response {
    let body = match transition_body(payload) {
        Ok(body) => body,
        Err(response) => return response,
    };
    let result = lock(&store).submit_vacation_request(&RequestId(request_id), body.actor());
    match result {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(error) => error.into_response(),
    }
}

async fn approve_handler(
    State(store): State<SharedStore>,
    Path(request_id): Path<String>,
    payload: Result<Json<TransitionBody>, JsonRejection>,
) -> Response {
    let body = match transition_body(payload) {
        Ok(body) => body,
        Err(response) => return response,
    };
    let result = lock(&store).approve_vacation_request(&RequestId(request_id), body.actor());
    match result {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(error) => error.into_response(),
    }
}

async fn deny_handler(
    State(store): State<SharedStore>,
    Path(request_id): Path<String>,
    payload: Result<Json<TransitionBody>, JsonRejection>,
) -> Response {
    let body = match transition_body(payload) {
        Ok(body) => body,
        Err(response) => return response,
    };
    let notes = body.notes.as_deref().unwrap_or_default();
    let result = lock(&store).deny_vacation_request(&RequestId(request_id), body.actor(), notes);
    match result {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(error) => error.into_response(),
    }
}

async fn allowance_summary_handler(
    State(store): State<SharedStore>,
    Path((provider_id, year)): Path<(String, i32)>,
) -> Response {
    let result = lock(&store).allowance_summary(&provider_id, year);
    match result {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error.into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct OverviewQuery {
    year: Option<i32>,
}

async fn allowance_overview_handler(
    State(store): State<SharedStore>,
    Query(query): Query<OverviewQuery>,
) -> Response {
    let guard = lock(&store);
    let Some(year) = query.year.or_else(|| guard.active_year()) else {
        return StoreError::from(PolicyViolation::WindowNotConfigured).into_response();
    };
    let rows = guard.allowance_overview(year);
    (StatusCode::OK, Json(json!({ "year": year, "rows": rows }))).into_response()
}

async fn fairness_handler(State(store): State<SharedStore>) -> Response {
    let guard = lock(&store);
    let payload = json!({
        "weekend_call": guard.weekend_call_deltas(),
        "hospital_days": guard.hospital_day_deltas(),
    });
    (StatusCode::OK, Json(payload)).into_response()
}

#[derive(Debug, Deserialize)]
struct BoardQuery {
    #[serde(alias = "weekStart")]
    week_start: Option<String>,
}

fn week_start(query: &BoardQuery) -> Result<Option<chrono::NaiveDate>, Response> {
    match query.week_start.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => calendar::parse_iso_date(raw).map(Some).ok_or_else(|| {
            StoreError::from(IntakeError::InvalidDate {
                field: "week_start",
                value: raw.to_string(),
            })
            .into_response()
        }),
    }
}

async fn board_handler(
    State(store): State<SharedStore>,
    Query(query): Query<BoardQuery>,
) -> Response {
    let week_start = match week_start(&query) {
        Ok(week_start) => week_start,
        Err(response) => return response,
    };
    let result = lock(&store).week_board(week_start);
    match result {
        Ok(board) => (StatusCode::OK, Json(board)).into_response(),
        Err(error) => error.into_response(),
    }
}

async fn coverage_handler(
    State(store): State<SharedStore>,
    Query(query): Query<BoardQuery>,
) -> Response {
    let week_start = match week_start(&query) {
        Ok(week_start) => week_start,
        Err(response) => return response,
    };
    let result = lock(&store).coverage_gaps(week_start);
    match result {
        Ok(gaps) => (StatusCode::OK, Json(gaps)).into_response(),
        Err(error) => error.into_response(),
    }
}
