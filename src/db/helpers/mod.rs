use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

use crate::db::models::{
    ContractorCategory, EntryType, LeaveType, ProjectStatus, Subject, SubjectKind, TimeSlot,
};

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

/// Dates are stored as `YYYY-MM-DD` text so they sort and compare as calendar days.
pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("failed to parse {field} '{value}'"))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_time_slot(value: &str) -> Result<TimeSlot> {
    match value {
        "AM1" => Ok(TimeSlot::Am1),
        "AM2" => Ok(TimeSlot::Am2),
        "PM1" => Ok(TimeSlot::Pm1),
        "PM2" => Ok(TimeSlot::Pm2),
        other => Err(anyhow!("unknown time slot {other}")),
    }
}

pub fn parse_entry_type(value: &str) -> Result<EntryType> {
    EntryType::ALL
        .into_iter()
        .find(|entry_type| entry_type.as_str() == value)
        .ok_or_else(|| anyhow!("unknown entry type {value}"))
}

pub fn parse_leave_type(value: &str) -> Result<LeaveType> {
    match value {
        "annual_leave" => Ok(LeaveType::AnnualLeave),
        "sick_leave" => Ok(LeaveType::SickLeave),
        "personal_leave" => Ok(LeaveType::PersonalLeave),
        "unpaid_leave" => Ok(LeaveType::UnpaidLeave),
        "parental_leave" => Ok(LeaveType::ParentalLeave),
        other => Err(anyhow!("unknown leave type {other}")),
    }
}

pub fn parse_subject(kind: &str, id: String) -> Result<Subject> {
    let kind = match kind {
        "technician" => SubjectKind::Technician,
        "contractor" => SubjectKind::Contractor,
        other => return Err(anyhow!("unknown subject kind {other}")),
    };
    Ok(Subject::new(kind, id))
}

pub fn parse_project_status(value: &str) -> Result<ProjectStatus> {
    match value {
        "active" => Ok(ProjectStatus::Active),
        "on_hold" => Ok(ProjectStatus::OnHold),
        "completed" => Ok(ProjectStatus::Completed),
        other => Err(anyhow!("unknown project status {other}")),
    }
}

pub fn parse_contractor_category(value: &str) -> Result<ContractorCategory> {
    match value {
        "contractor" => Ok(ContractorCategory::Contractor),
        "subcontractor" => Ok(ContractorCategory::Subcontractor),
        other => Err(anyhow!("unknown contractor category {other}")),
    }
}

/// Trims free text and maps blank input to `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|text| {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
