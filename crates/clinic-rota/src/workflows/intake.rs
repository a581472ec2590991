//! Boundary normalization for configuration and request payloads.
//!
//! Upstream producers send either snake_case or camelCase field names. Each raw payload type
//! accepts both spellings, even side by side, and `normalize()` turns it into the canonical
//! record. When a field arrives under both names the snake_case value wins. Nothing past
//! this module branches on field naming.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::workflows::roster::{
    CallAssignment, CallType, FairnessTargets, Holiday, Provider, ScheduleAssignment,
    SchedulingWindow, SessionBlock, SiteKind,
};
use crate::workflows::vacation::domain::{VacationBlock, VacationDraft, DEFAULT_ACTOR};
use crate::workflows::vacation::ledger::AllowanceRecord;

/// Validation errors raised while normalizing inbound payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("{record} is missing required field `{field}`")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },
    #[error("`{field}` must be an ISO date (found {value:?})")]
    InvalidDate { field: &'static str, value: String },
    #[error("unsupported vacation block {0:?}")]
    UnknownBlock(String),
    #[error("unsupported session block {0:?}")]
    UnknownSession(String),
    #[error("unsupported call type {0:?}")]
    UnknownCallType(String),
    #[error("window start {start} is after window end {end}")]
    InvertedWindow { start: NaiveDate, end: NaiveDate },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowPayload {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl WindowPayload {
    pub fn normalize(self) -> Result<SchedulingWindow, IntakeError> {
        let start = required_date("window", "start", &self.start)?;
        let end = required_date("window", "end", &self.end)?;
        SchedulingWindow::new(start, end).ok_or(IntakeError::InvertedWindow { start, end })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderPayload {
    pub id: Option<String>,
    pub initials: Option<String>,
    pub full_name: Option<String>,
    #[serde(default, rename = "fullName", skip_serializing_if = "Option::is_none")]
    pub full_name_camel: Option<String>,
    pub role: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub provider_type: Option<String>,
}

impl ProviderPayload {
    pub fn normalize(self) -> Result<Provider, IntakeError> {
        let id = required_text("provider", "id", &self.id)?;
        let initials = present(&self.initials).unwrap_or(id.as_str()).to_string();
        Ok(Provider {
            initials,
            full_name: either(&self.full_name, &self.full_name_camel).map(str::to_owned),
            role: either(&self.role, &self.provider_type).map(str::to_owned),
            id,
        })
    }
}

/// Holidays arrive either as full records or as bare date strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HolidayPayload {
    Date(String),
    Record(HolidayRecordPayload),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HolidayRecordPayload {
    pub date: Option<String>,
    pub name: Option<String>,
    pub is_office_closed: Option<bool>,
    #[serde(default, rename = "isOfficeClosed", skip_serializing_if = "Option::is_none")]
    pub is_office_closed_camel: Option<bool>,
    pub extend_weekend: Option<bool>,
    #[serde(default, rename = "extendWeekend", skip_serializing_if = "Option::is_none")]
    pub extend_weekend_camel: Option<bool>,
}

impl HolidayPayload {
    pub fn normalize(self) -> Result<Holiday, IntakeError> {
        match self {
            HolidayPayload::Date(raw) => Ok(Holiday {
                date: parse_date("date", &raw)?,
                name: String::new(),
                is_office_closed: false,
                extend_weekend: false,
            }),
            HolidayPayload::Record(record) => Ok(Holiday {
                date: required_date("holiday", "date", &record.date)?,
                name: record.name.unwrap_or_default(),
                is_office_closed: record
                    .is_office_closed
                    .or(record.is_office_closed_camel)
                    .unwrap_or(false),
                extend_weekend: record
                    .extend_weekend
                    .or(record.extend_weekend_camel)
                    .unwrap_or(false),
            }),
        }
    }
}

/// Allowance record. Each field takes its snake_case spelling first and falls back to the
/// camelCase one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllowancePayload {
    pub provider_id: Option<String>,
    #[serde(default, rename = "providerId", skip_serializing_if = "Option::is_none")]
    pub provider_id_camel: Option<String>,
    pub year: Option<i32>,
    pub days_total: Option<f64>,
    #[serde(default, rename = "daysTotal", skip_serializing_if = "Option::is_none")]
    pub days_total_camel: Option<f64>,
    pub days_used: Option<f64>,
    #[serde(default, rename = "daysUsed", skip_serializing_if = "Option::is_none")]
    pub days_used_camel: Option<f64>,
    pub am_quota: Option<f64>,
    #[serde(default, rename = "amQuota", skip_serializing_if = "Option::is_none")]
    pub am_quota_camel: Option<f64>,
    pub pm_quota: Option<f64>,
    #[serde(default, rename = "pmQuota", skip_serializing_if = "Option::is_none")]
    pub pm_quota_camel: Option<f64>,
    pub am_used: Option<f64>,
    #[serde(default, rename = "amUsed", skip_serializing_if = "Option::is_none")]
    pub am_used_camel: Option<f64>,
    pub pm_used: Option<f64>,
    #[serde(default, rename = "pmUsed", skip_serializing_if = "Option::is_none")]
    pub pm_used_camel: Option<f64>,
}

impl AllowancePayload {
    pub fn normalize(self) -> Result<AllowanceRecord, IntakeError> {
        let provider_id = either(&self.provider_id, &self.provider_id_camel)
            .map(str::to_owned)
            .ok_or(IntakeError::MissingField {
                record: "allowance",
                field: "provider_id",
            })?;
        let year = self.year.ok_or(IntakeError::MissingField {
            record: "allowance",
            field: "year",
        })?;
        Ok(AllowanceRecord {
            provider_id,
            year,
            days_total: self.days_total.or(self.days_total_camel).unwrap_or(0.0),
            days_used: self.days_used.or(self.days_used_camel).unwrap_or(0.0),
            am_quota: self.am_quota.or(self.am_quota_camel),
            pm_quota: self.pm_quota.or(self.pm_quota_camel),
            am_used: self.am_used.or(self.am_used_camel).unwrap_or(0.0),
            pm_used: self.pm_used.or(self.pm_used_camel).unwrap_or(0.0),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleAssignmentPayload {
    pub date: Option<String>,
    pub block: Option<String>,
    pub session: Option<String>,
    #[serde(default, rename = "siteLabel")]
    pub site_label: Option<String>,
    pub site_name: Option<String>,
    #[serde(default, rename = "siteName", skip_serializing_if = "Option::is_none")]
    pub site_name_camel: Option<String>,
    pub site_code: Option<String>,
    #[serde(default, rename = "siteCode", skip_serializing_if = "Option::is_none")]
    pub site_code_camel: Option<String>,
    pub site_id: Option<String>,
    #[serde(default, rename = "siteId", skip_serializing_if = "Option::is_none")]
    pub site_id_camel: Option<String>,
    pub site: Option<String>,
    pub site_type: Option<String>,
    #[serde(default, rename = "siteType", skip_serializing_if = "Option::is_none")]
    pub site_type_camel: Option<String>,
    #[serde(default)]
    pub site_type_code: Option<String>,
    #[serde(default, rename = "providerDisplay")]
    pub provider_display: Option<String>,
    #[serde(default, rename = "providerInitials")]
    pub provider_initials: Option<String>,
    pub provider_id: Option<String>,
    #[serde(default, rename = "providerId", skip_serializing_if = "Option::is_none")]
    pub provider_id_camel: Option<String>,
    pub provider: Option<String>,
    pub role: Option<String>,
}

impl ScheduleAssignmentPayload {
    pub fn normalize(self) -> Result<ScheduleAssignment, IntakeError> {
        let date = required_date("schedule assignment", "date", &self.date)?;
        let block = match present(&self.block).or_else(|| present(&self.session)) {
            Some(raw) => {
                SessionBlock::parse(raw).ok_or_else(|| IntakeError::UnknownSession(raw.into()))?
            }
            None => SessionBlock::Am,
        };
        let site = present(&self.site_label)
            .or_else(|| either(&self.site_name, &self.site_name_camel))
            .or_else(|| either(&self.site_code, &self.site_code_camel))
            .or_else(|| either(&self.site_id, &self.site_id_camel))
            .or_else(|| present(&self.site))
            .unwrap_or_default()
            .to_string();
        let site_type = either(&self.site_type, &self.site_type_camel)
            .or_else(|| present(&self.site_type_code))
            .map(SiteKind::from_label)
            .unwrap_or(SiteKind::Unspecified);
        let provider_id = either(&self.provider_id, &self.provider_id_camel)
            .or_else(|| present(&self.provider))
            .ok_or(IntakeError::MissingField {
                record: "schedule assignment",
                field: "provider",
            })?
            .to_string();
        let provider_label = present(&self.provider_display)
            .or_else(|| present(&self.provider_initials))
            .map(str::to_owned);

        Ok(ScheduleAssignment {
            date,
            block,
            site,
            site_type,
            provider_id,
            provider_label,
            role: present(&self.role).map(str::to_owned),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallAssignmentPayload {
    pub date: Option<String>,
    #[serde(default, rename = "type")]
    pub call_type: Option<String>,
    #[serde(default, rename = "call_type", skip_serializing_if = "Option::is_none")]
    pub call_type_snake: Option<String>,
    #[serde(default, rename = "callType", skip_serializing_if = "Option::is_none")]
    pub call_type_camel: Option<String>,
    pub label: Option<String>,
    pub day: Option<String>,
    #[serde(default, rename = "providerDisplay")]
    pub provider_display: Option<String>,
    #[serde(default, rename = "providerInitials")]
    pub provider_initials: Option<String>,
    pub provider_id: Option<String>,
    #[serde(default, rename = "providerId", skip_serializing_if = "Option::is_none")]
    pub provider_id_camel: Option<String>,
    pub provider: Option<String>,
}

impl CallAssignmentPayload {
    pub fn normalize(self) -> Result<CallAssignment, IntakeError> {
        let date = required_date("call assignment", "date", &self.date)?;
        let raw_type = present(&self.call_type)
            .or_else(|| either(&self.call_type_snake, &self.call_type_camel))
            .map(str::to_owned)
            .ok_or(IntakeError::MissingField {
                record: "call assignment",
                field: "type",
            })?;
        let call_type =
            CallType::parse(&raw_type).ok_or(IntakeError::UnknownCallType(raw_type))?;
        let label = present(&self.label)
            .or_else(|| present(&self.day))
            .map(str::to_owned)
            .unwrap_or_else(|| calendar::to_iso_date(date));
        let provider_id = either(&self.provider_id, &self.provider_id_camel)
            .or_else(|| present(&self.provider))
            .ok_or(IntakeError::MissingField {
                record: "call assignment",
                field: "provider",
            })?
            .to_string();
        let provider_label = present(&self.provider_display)
            .or_else(|| present(&self.provider_initials))
            .map(str::to_owned);

        Ok(CallAssignment {
            date,
            call_type,
            label,
            provider_id,
            provider_label,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FairnessTargetsPayload {
    pub weekend_call: Option<BTreeMap<String, f64>>,
    #[serde(default, rename = "weekendCall", skip_serializing_if = "Option::is_none")]
    pub weekend_call_camel: Option<BTreeMap<String, f64>>,
    pub hospital_days: Option<BTreeMap<String, f64>>,
    #[serde(default, rename = "hospitalDays", skip_serializing_if = "Option::is_none")]
    pub hospital_days_camel: Option<BTreeMap<String, f64>>,
}

impl FairnessTargetsPayload {
    pub fn normalize(self) -> FairnessTargets {
        FairnessTargets {
            weekend_call: self
                .weekend_call
                .or(self.weekend_call_camel)
                .unwrap_or_default(),
            hospital_days: self
                .hospital_days
                .or(self.hospital_days_camel)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftPayload {
    pub provider_id: Option<String>,
    #[serde(default, rename = "providerId", skip_serializing_if = "Option::is_none")]
    pub provider_id_camel: Option<String>,
    pub block: Option<String>,
    pub start_date: Option<String>,
    #[serde(default, rename = "startDate", skip_serializing_if = "Option::is_none")]
    pub start_date_camel: Option<String>,
    pub end_date: Option<String>,
    #[serde(default, rename = "endDate", skip_serializing_if = "Option::is_none")]
    pub end_date_camel: Option<String>,
    pub actor: Option<String>,
    pub notes: Option<String>,
}

impl DraftPayload {
    /// Presence checks run provider, block, then dates. A missing end date mirrors the start.
    pub fn normalize(self) -> Result<VacationDraft, IntakeError> {
        let provider_id = either(&self.provider_id, &self.provider_id_camel)
            .map(str::to_owned)
            .ok_or(IntakeError::MissingField {
                record: "vacation request",
                field: "provider_id",
            })?;
        let raw_block = required_text("vacation request", "block", &self.block)?;
        let block = VacationBlock::parse(&raw_block).ok_or(IntakeError::UnknownBlock(raw_block))?;
        let raw_start = either(&self.start_date, &self.start_date_camel).ok_or(
            IntakeError::MissingField {
                record: "vacation request",
                field: "start_date",
            },
        )?;
        let start_date = parse_date("start_date", raw_start)?;
        let end_date = match either(&self.end_date, &self.end_date_camel) {
            Some(raw) => parse_date("end_date", raw)?,
            None => start_date,
        };

        Ok(VacationDraft {
            provider_id,
            block,
            start_date,
            end_date,
            actor: present(&self.actor).unwrap_or(DEFAULT_ACTOR).to_string(),
            notes: self.notes.unwrap_or_default(),
        })
    }
}

/// snake_case spelling first, camelCase second.
fn either<'a>(snake: &'a Option<String>, camel: &'a Option<String>) -> Option<&'a str> {
    present(snake).or_else(|| present(camel))
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn required_text(
    record: &'static str,
    field: &'static str,
    value: &Option<String>,
) -> Result<String, IntakeError> {
    present(value)
        .map(str::to_owned)
        .ok_or(IntakeError::MissingField { record, field })
}

fn required_date(
    record: &'static str,
    field: &'static str,
    value: &Option<String>,
) -> Result<NaiveDate, IntakeError> {
    let raw = present(value).ok_or(IntakeError::MissingField { record, field })?;
    parse_date(field, raw)
}

fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, IntakeError> {
    calendar::parse_iso_date(raw).ok_or_else(|| IntakeError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}
