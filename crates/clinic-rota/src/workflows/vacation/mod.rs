//! Vacation request lifecycle: drafts, status transitions, impact sizing and the
//! per-provider allowance ledger that approvals draw down.

pub mod domain;
pub mod impact;
pub mod ledger;
pub(crate) mod policy;

#[cfg(test)]
mod tests;

pub use domain::{
    AuditAction, AuditEntry, RequestId, RequestMetadata, VacationBlock, VacationDraft,
    VacationRequest, VacationStatus,
};
pub use impact::{compute_impact, SpanViolation, VacationImpact};
pub use ledger::{
    AllowanceLedger, AllowanceRecord, LedgerDirection, LedgerError, QuotaKind, QUOTA_EPSILON,
};
pub use policy::PolicyViolation;
