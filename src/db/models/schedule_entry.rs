//! Schedule entry data models.
//!
//! A `ScheduleEntry` is one persisted assignment of one subject to one time slot on one
//! day. `(date, time_slot, subject)` is its natural key.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::PublicHoliday;

/// The four fixed sub-periods of a working day, in display order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeSlot {
    #[serde(rename = "AM1")]
    Am1,
    #[serde(rename = "AM2")]
    Am2,
    #[serde(rename = "PM1")]
    Pm1,
    #[serde(rename = "PM2")]
    Pm2,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 4] = [TimeSlot::Am1, TimeSlot::Am2, TimeSlot::Pm1, TimeSlot::Pm2];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::Am1 => "AM1",
            TimeSlot::Am2 => "AM2",
            TimeSlot::Pm1 => "PM1",
            TimeSlot::Pm2 => "PM2",
        }
    }

    pub fn index(self) -> usize {
        match self {
            TimeSlot::Am1 => 0,
            TimeSlot::Am2 => 1,
            TimeSlot::Pm1 => 2,
            TimeSlot::Pm2 => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SubjectKind {
    Technician,
    Contractor,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectKind::Technician => "technician",
            SubjectKind::Contractor => "contractor",
        }
    }
}

/// The person being scheduled: an internal technician (user) or an external contractor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum Subject {
    Technician(String),
    Contractor(String),
}

impl Subject {
    pub fn new(kind: SubjectKind, id: impl Into<String>) -> Self {
        match kind {
            SubjectKind::Technician => Subject::Technician(id.into()),
            SubjectKind::Contractor => Subject::Contractor(id.into()),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Subject::Technician(id) | Subject::Contractor(id) => id,
        }
    }

    pub fn kind(&self) -> SubjectKind {
        match self {
            Subject::Technician(_) => SubjectKind::Technician,
            Subject::Contractor(_) => SubjectKind::Contractor,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum EntryType {
    Project,
    Leave,
    Training,
    Office,
    Unavailable,
}

impl EntryType {
    pub const ALL: [EntryType; 5] = [
        EntryType::Project,
        EntryType::Leave,
        EntryType::Training,
        EntryType::Office,
        EntryType::Unavailable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Project => "project",
            EntryType::Leave => "leave",
            EntryType::Training => "training",
            EntryType::Office => "office",
            EntryType::Unavailable => "unavailable",
        }
    }

    /// Label used when a cell has nothing more specific to show.
    pub fn short_label(&self) -> &'static str {
        match self {
            EntryType::Project => "PRJ",
            EntryType::Leave => "LEAVE",
            EntryType::Training => "TRAIN",
            EntryType::Office => "OFFICE",
            EntryType::Unavailable => "N/A",
        }
    }
}

impl Default for EntryType {
    fn default() -> Self {
        EntryType::Project
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum LeaveType {
    AnnualLeave,
    SickLeave,
    PersonalLeave,
    UnpaidLeave,
    ParentalLeave,
}

impl LeaveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveType::AnnualLeave => "annual_leave",
            LeaveType::SickLeave => "sick_leave",
            LeaveType::PersonalLeave => "personal_leave",
            LeaveType::UnpaidLeave => "unpaid_leave",
            LeaveType::ParentalLeave => "parental_leave",
        }
    }

    pub fn short_label(&self) -> &'static str {
        match self {
            LeaveType::AnnualLeave => "AL",
            LeaveType::SickLeave => "SL",
            LeaveType::PersonalLeave => "PL",
            LeaveType::UnpaidLeave => "UL",
            LeaveType::ParentalLeave => "PAR",
        }
    }
}

/// Entry type together with the payload that type requires.
///
/// A project reference exists only on `Project`, a leave category only on `Leave`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "entryType", rename_all = "camelCase")]
pub enum Assignment {
    Project {
        #[serde(rename = "projectId")]
        project_id: String,
    },
    Leave {
        #[serde(rename = "leaveType")]
        leave_type: LeaveType,
    },
    Training,
    Office,
    Unavailable,
}

impl Assignment {
    /// Returns `None` when the type needs a payload that is missing.
    pub fn from_parts(
        entry_type: EntryType,
        project_id: Option<String>,
        leave_type: Option<LeaveType>,
    ) -> Option<Self> {
        match entry_type {
            EntryType::Project => project_id
                .filter(|id| !id.trim().is_empty())
                .map(|project_id| Assignment::Project { project_id }),
            EntryType::Leave => leave_type.map(|leave_type| Assignment::Leave { leave_type }),
            EntryType::Training => Some(Assignment::Training),
            EntryType::Office => Some(Assignment::Office),
            EntryType::Unavailable => Some(Assignment::Unavailable),
        }
    }

    pub fn entry_type(&self) -> EntryType {
        match self {
            Assignment::Project { .. } => EntryType::Project,
            Assignment::Leave { .. } => EntryType::Leave,
            Assignment::Training => EntryType::Training,
            Assignment::Office => EntryType::Office,
            Assignment::Unavailable => EntryType::Unavailable,
        }
    }

    pub fn project_id(&self) -> Option<&str> {
        match self {
            Assignment::Project { project_id } => Some(project_id),
            _ => None,
        }
    }

    pub fn leave_type(&self) -> Option<LeaveType> {
        match self {
            Assignment::Leave { leave_type } => Some(*leave_type),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub subject: Subject,
}

/// A persisted schedule entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub id: String,
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub subject: Subject,
    #[serde(flatten)]
    pub assignment: Assignment,
    pub description: Option<String>,
    pub notes: Option<String>,
}

impl ScheduleEntry {
    pub fn entry_type(&self) -> EntryType {
        self.assignment.entry_type()
    }

    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            date: self.date,
            time_slot: self.time_slot,
            subject: self.subject.clone(),
        }
    }

    pub fn has_notes(&self) -> bool {
        self.notes
            .as_deref()
            .map(|notes| !notes.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Content of an entry that is about to be written, keyed by its natural key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntryDraft {
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub subject: Subject,
    #[serde(flatten)]
    pub assignment: Assignment,
    pub description: Option<String>,
    pub notes: Option<String>,
}

impl EntryDraft {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            date: self.date,
            time_slot: self.time_slot,
            subject: self.subject.clone(),
        }
    }
}

/// How a bulk write treats an existing row with the same natural key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum WriteMode {
    /// Replace the existing row's content in place.
    Upsert,
    /// Fail the whole batch on a natural-key collision.
    Insert,
}

/// Entries and holidays for one date range.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleData {
    pub entries: Vec<ScheduleEntry>,
    pub holidays: Vec<PublicHoliday>,
}
