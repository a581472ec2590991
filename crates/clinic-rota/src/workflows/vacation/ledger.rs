use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::impact::VacationImpact;

/// Tolerance applied to quota comparisons so rounding never trips a limit.
pub const QUOTA_EPSILON: f64 = 1e-6;

/// Annual time-off allowance for one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowanceRecord {
    pub provider_id: String,
    pub year: i32,
    pub days_total: f64,
    pub days_used: f64,
    /// `None` leaves AM units untracked.
    pub am_quota: Option<f64>,
    /// `None` leaves PM units untracked.
    pub pm_quota: Option<f64>,
    pub am_used: f64,
    pub pm_used: f64,
}

impl AllowanceRecord {
    pub fn days_available(&self) -> f64 {
        round_units(self.days_total - self.days_used)
    }

    pub fn am_available(&self) -> Option<f64> {
        self.am_quota.map(|quota| round_units(quota - self.am_used))
    }

    pub fn pm_available(&self) -> Option<f64> {
        self.pm_quota.map(|quota| round_units(quota - self.pm_used))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerDirection {
    Apply,
    Revert,
}

impl LedgerDirection {
    fn multiplier(self) -> f64 {
        match self {
            Self::Apply => 1.0,
            Self::Revert => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaKind {
    TotalDays,
    AmUnits,
    PmUnits,
}

impl QuotaKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::TotalDays => "total days",
            Self::AmUnits => "AM units",
            Self::PmUnits => "PM units",
        }
    }
}

impl fmt::Display for QuotaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("no allowance configured for provider {provider_id} in {year}")]
    NotConfigured { provider_id: String, year: i32 },
    #[error("insufficient {kind} for provider {provider_id} in {year} (proposed {proposed}, quota {quota})")]
    QuotaExceeded {
        provider_id: String,
        year: i32,
        kind: QuotaKind,
        proposed: f64,
        quota: f64,
    },
}

/// Per-provider, per-year allowance accounting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllowanceLedger {
    records: BTreeMap<String, BTreeMap<i32, AllowanceRecord>>,
}

impl AllowanceLedger {
    /// Build a ledger from bulk records. A repeated `(provider, year)` keeps the last record.
    pub fn from_records(records: impl IntoIterator<Item = AllowanceRecord>) -> Self {
        let mut ledger = Self::default();
        for record in records {
            ledger
                .records
                .entry(record.provider_id.clone())
                .or_default()
                .insert(record.year, record);
        }
        ledger
    }

    pub fn locate(&self, provider_id: &str, year: i32) -> Result<&AllowanceRecord, LedgerError> {
        self.records
            .get(provider_id)
            .and_then(|years| years.get(&year))
            .ok_or_else(|| LedgerError::NotConfigured {
                provider_id: provider_id.to_owned(),
                year,
            })
    }

    /// Adjust usage by `impact`. Every dimension is checked before any is written.
    pub fn apply(
        &mut self,
        provider_id: &str,
        year: i32,
        impact: &VacationImpact,
        direction: LedgerDirection,
    ) -> Result<&AllowanceRecord, LedgerError> {
        let current = self.locate(provider_id, year)?;
        let multiplier = direction.multiplier();

        let days_used = current.days_used + multiplier * impact.days;
        check_quota(current, QuotaKind::TotalDays, days_used, Some(current.days_total))?;

        let am_used = current.am_quota.map(|_| current.am_used + multiplier * impact.am);
        if let Some(proposed) = am_used {
            check_quota(current, QuotaKind::AmUnits, proposed, current.am_quota)?;
        }

        let pm_used = current.pm_quota.map(|_| current.pm_used + multiplier * impact.pm);
        if let Some(proposed) = pm_used {
            check_quota(current, QuotaKind::PmUnits, proposed, current.pm_quota)?;
        }

        let record = self
            .records
            .get_mut(provider_id)
            .and_then(|years| years.get_mut(&year))
            .ok_or_else(|| LedgerError::NotConfigured {
                provider_id: provider_id.to_owned(),
                year,
            })?;

        record.days_used = round_units(days_used);
        if let Some(value) = am_used {
            record.am_used = round_units(value);
        }
        if let Some(value) = pm_used {
            record.pm_used = round_units(value);
        }

        Ok(record)
    }

    /// Nested `provider -> year -> record` view.
    pub fn records(&self) -> &BTreeMap<String, BTreeMap<i32, AllowanceRecord>> {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn check_quota(
    record: &AllowanceRecord,
    kind: QuotaKind,
    proposed: f64,
    quota: Option<f64>,
) -> Result<(), LedgerError> {
    match quota {
        Some(quota) if proposed > quota + QUOTA_EPSILON => Err(LedgerError::QuotaExceeded {
            provider_id: record.provider_id.clone(),
            year: record.year,
            kind,
            proposed: round_units(proposed),
            quota,
        }),
        _ => Ok(()),
    }
}

/// Round to three decimals so repeated half-day updates do not drift.
pub(crate) fn round_units(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
