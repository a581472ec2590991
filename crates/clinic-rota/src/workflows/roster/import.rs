use std::io::Read;
use std::path::Path;

use super::domain::{CallAssignment, ScheduleAssignment};
use crate::workflows::intake::{CallAssignmentPayload, IntakeError, ScheduleAssignmentPayload};

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Row { row: usize, source: IntakeError },
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read roster export: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
            RosterImportError::Row { row, source } => {
                write!(f, "roster CSV row {} rejected: {}", row, source)
            }
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::Row { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// CSV loader for schedule and call assignment exports.
///
/// Column headers use the same field names as the JSON payloads; blank cells count as
/// missing values.
pub struct RosterImporter;

impl RosterImporter {
    pub fn schedule_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<ScheduleAssignment>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::schedule_from_reader(file)
    }

    pub fn schedule_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<ScheduleAssignment>, RosterImportError> {
        parse_rows(reader, ScheduleAssignmentPayload::normalize)
    }

    pub fn calls_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<CallAssignment>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::calls_from_reader(file)
    }

    pub fn calls_from_reader<R: Read>(reader: R) -> Result<Vec<CallAssignment>, RosterImportError> {
        parse_rows(reader, CallAssignmentPayload::normalize)
    }
}

fn parse_rows<R, P, T>(
    reader: R,
    normalize: fn(P) -> Result<T, IntakeError>,
) -> Result<Vec<T>, RosterImportError>
where
    R: Read,
    P: serde::de::DeserializeOwned,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<P>().enumerate() {
        let payload = record?;
        let row = normalize(payload).map_err(|source| RosterImportError::Row {
            row: index + 1,
            source,
        })?;
        rows.push(row);
    }

    Ok(rows)
}
