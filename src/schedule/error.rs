use chrono::NaiveDate;
use thiserror::Error;

/// Input problems caught before any call reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("select a group before adding a member")]
    MissingGroup,
    #[error("unknown group {0}")]
    UnknownGroup(String),
    #[error("select a technician or contractor to add")]
    MissingSubject,
    #[error("{0} is already a member of this group")]
    DuplicateMember(String),
    #[error("contractor name is required")]
    MissingContractorName,
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("{0} is a public holiday ({1}) and cannot be edited")]
    HolidayLocked(NaiveDate, String),
    #[error("{0} is outside the loaded date range")]
    OutsideRange(NaiveDate),
    #[error("the schedule for {0} has not loaded")]
    NotLoaded(NaiveDate),
    #[error("no cell is open for editing")]
    NoOpenCell,
}
