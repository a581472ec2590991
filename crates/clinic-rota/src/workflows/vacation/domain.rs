use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for vacation requests (`VR-00001`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl RequestId {
    pub(crate) fn from_sequence(sequence: u64) -> Self {
        Self(format!("VR-{sequence:05}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Granularity of a time-off request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VacationBlock {
    Am,
    Pm,
    #[serde(rename = "FULLDAY")]
    FullDay,
    #[serde(rename = "FULLWEEK")]
    FullWeek,
}

impl VacationBlock {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Am => "AM",
            Self::Pm => "PM",
            Self::FullDay => "FULLDAY",
            Self::FullWeek => "FULLWEEK",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "AM" => Some(Self::Am),
            "PM" => Some(Self::Pm),
            "FULLDAY" => Some(Self::FullDay),
            "FULLWEEK" => Some(Self::FullWeek),
            _ => None,
        }
    }

    /// Blocks that must start and end on a weekday.
    pub const fn requires_weekdays(self) -> bool {
        !matches!(self, Self::FullWeek)
    }
}

impl fmt::Display for VacationBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VacationStatus {
    Draft,
    Submitted,
    Approved,
    Denied,
}

impl VacationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Submitted => "SUBMITTED",
            Self::Approved => "APPROVED",
            Self::Denied => "DENIED",
        }
    }

    pub const fn allowed_transitions(self) -> &'static [VacationStatus] {
        match self {
            Self::Draft => &[Self::Submitted],
            Self::Submitted => &[Self::Approved, Self::Denied],
            Self::Approved | Self::Denied => &[],
        }
    }

    pub fn can_transition_to(self, next: VacationStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub const fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

impl fmt::Display for VacationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Submitted,
    Approved,
    Denied,
}

impl From<VacationStatus> for AuditAction {
    fn from(status: VacationStatus) -> Self {
        match status {
            VacationStatus::Draft => AuditAction::Create,
            VacationStatus::Submitted => AuditAction::Submitted,
            VacationStatus::Approved => AuditAction::Approved,
            VacationStatus::Denied => AuditAction::Denied,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub actor: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMetadata {
    pub notes: String,
    pub created_by: String,
}

/// A time-off request and its full transition history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationRequest {
    pub id: RequestId,
    pub provider_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub block: VacationBlock,
    pub status: VacationStatus,
    pub approver_id: Option<String>,
    pub audit_log: Vec<AuditEntry>,
    pub metadata: RequestMetadata,
}

/// Validated draft input, produced by the intake layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VacationDraft {
    pub provider_id: String,
    pub block: VacationBlock,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub actor: String,
    pub notes: String,
}

impl VacationDraft {
    /// Draft attributed to the default `user` actor, without notes.
    pub fn new(
        provider_id: impl Into<String>,
        block: VacationBlock,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            block,
            start_date,
            end_date,
            actor: DEFAULT_ACTOR.to_string(),
            notes: String::new(),
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

pub(crate) const DEFAULT_ACTOR: &str = "user";
