use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::workflows::intake::IntakeError;
use crate::workflows::vacation::{
    LedgerError, PolicyViolation, QuotaKind, RequestId, SpanViolation, VacationStatus,
};

/// Error raised by store operations. State is untouched whenever one is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Malformed(#[from] IntakeError),
    #[error(transparent)]
    Policy(#[from] PolicyViolation),
    #[error(transparent)]
    Span(#[from] SpanViolation),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("vacation request {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: RequestId,
        from: VacationStatus,
        to: VacationStatus,
    },
    #[error("unknown vacation request {0}")]
    UnknownRequest(RequestId),
}

/// Flat classification of [`StoreError`] exposed to callers and HTTP clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotConfigured,
    OutOfWindow,
    HolidayConflict,
    WeekendNotAllowed,
    InvalidSpan,
    InvalidTransition,
    QuotaExceeded(QuotaKind),
    UnknownEntity,
    MalformedInput,
}

impl ErrorKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::OutOfWindow => "out_of_window",
            Self::HolidayConflict => "holiday_conflict",
            Self::WeekendNotAllowed => "weekend_not_allowed",
            Self::InvalidSpan => "invalid_span",
            Self::InvalidTransition => "invalid_transition",
            Self::QuotaExceeded(_) => "quota_exceeded",
            Self::UnknownEntity => "unknown_entity",
            Self::MalformedInput => "malformed_input",
        }
    }

    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::MalformedInput => StatusCode::BAD_REQUEST,
            Self::NotConfigured | Self::UnknownEntity => StatusCode::NOT_FOUND,
            Self::InvalidTransition | Self::QuotaExceeded(_) => StatusCode::CONFLICT,
            Self::OutOfWindow
            | Self::HolidayConflict
            | Self::WeekendNotAllowed
            | Self::InvalidSpan => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Malformed(_) => ErrorKind::MalformedInput,
            StoreError::Policy(violation) => match violation {
                PolicyViolation::WindowNotConfigured => ErrorKind::NotConfigured,
                PolicyViolation::OutOfWindow { .. } => ErrorKind::OutOfWindow,
                PolicyViolation::Span(_) => ErrorKind::InvalidSpan,
                PolicyViolation::HolidayConflict { .. } => ErrorKind::HolidayConflict,
                PolicyViolation::WeekendNotAllowed { .. } => ErrorKind::WeekendNotAllowed,
            },
            StoreError::Span(_) => ErrorKind::InvalidSpan,
            StoreError::Ledger(LedgerError::NotConfigured { .. }) => ErrorKind::NotConfigured,
            StoreError::Ledger(LedgerError::QuotaExceeded { kind, .. }) => {
                ErrorKind::QuotaExceeded(*kind)
            }
            StoreError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            StoreError::UnknownRequest(_) => ErrorKind::UnknownEntity,
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let mut body = json!({
            "error": self.to_string(),
            "kind": kind.label(),
        });
        if let ErrorKind::QuotaExceeded(quota) = kind {
            body["quota"] = json!(quota);
        }
        (kind.status_code(), Json(body)).into_response()
    }
}
