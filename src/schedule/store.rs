//! The loaded view of the schedule for one date range, and the cell index over it.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::{
    calendar::{date_key, DateRange},
    db::{
        Contractor, GroupMember, Project, PublicHoliday, ScheduleEntry, TechnicianGroup, User,
    },
    log_info,
};

use super::backend::ScheduleBackend;

const ENABLE_LOGS: bool = true;

/// Read-only snapshot of everything the grid shows for `range`.
///
/// A snapshot is never patched. Every navigation or save produces a new one.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSnapshot {
    pub range: DateRange,
    pub groups: Vec<TechnicianGroup>,
    pub entries: Vec<ScheduleEntry>,
    pub holidays: Vec<PublicHoliday>,
    pub projects: Vec<Project>,
    pub contractors: Vec<Contractor>,
    pub users: Vec<User>,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl ScheduleSnapshot {
    /// Placeholder shown before the first load completes.
    pub fn empty(range: DateRange) -> Self {
        Self {
            range,
            groups: Vec::new(),
            entries: Vec::new(),
            holidays: Vec::new(),
            projects: Vec::new(),
            contractors: Vec::new(),
            users: Vec::new(),
            loaded_at: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded_at.is_some()
    }

    /// The 0 to 4 entries in one grid cell, in slot order.
    ///
    /// Matches on the subject's id alone, so a technician id and a contractor id are
    /// compared the same way.
    pub fn entries_for_cell(&self, subject_id: &str, date: NaiveDate) -> Vec<&ScheduleEntry> {
        let key = date_key(&date);
        let mut entries: Vec<&ScheduleEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.subject.id() == subject_id && date_key(&entry.date) == key)
            .collect();
        entries.sort_by_key(|entry| entry.time_slot);
        entries
    }

    pub fn holiday_for(&self, date: NaiveDate) -> Option<&PublicHoliday> {
        let key = date_key(&date);
        self.holidays
            .iter()
            .find(|holiday| date_key(&holiday.date) == key)
    }

    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == project_id)
    }

    pub fn contractor(&self, contractor_id: &str) -> Option<&Contractor> {
        self.contractors
            .iter()
            .find(|contractor| contractor.id == contractor_id)
    }

    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|user| user.id == user_id)
    }

    pub fn group(&self, group_id: &str) -> Option<&TechnicianGroup> {
        self.groups.iter().find(|group| group.id == group_id)
    }

    /// Grid rows: every membership of every group, in display order. A subject that
    /// belongs to two groups appears twice.
    pub fn rows(&self) -> impl Iterator<Item = (&TechnicianGroup, &GroupMember)> {
        self.groups
            .iter()
            .flat_map(|group| group.members.iter().map(move |member| (group, member)))
    }
}

/// Fetches the datasets for `range` concurrently.
///
/// Any failed fetch fails the whole load; no partial snapshot is ever returned.
pub async fn load_snapshot(
    backend: &dyn ScheduleBackend,
    range: DateRange,
) -> Result<ScheduleSnapshot> {
    let (groups, schedule, mut projects, contractors, users) = tokio::try_join!(
        async { backend.fetch_groups().await.context("failed to load technician groups") },
        async {
            backend
                .fetch_schedule(range)
                .await
                .context("failed to load schedule entries")
        },
        async { backend.fetch_projects().await.context("failed to load projects") },
        async { backend.fetch_contractors().await.context("failed to load contractors") },
        async { backend.fetch_users().await.context("failed to load technicians") },
    )?;

    projects.retain(Project::is_eligible);

    let mut entries = schedule.entries;
    entries.retain(|entry| range.contains(entry.date));
    entries.sort_by(|a, b| (a.date, a.time_slot).cmp(&(b.date, b.time_slot)));

    log_info!(
        "Loaded {} entries and {} holidays for {} to {}",
        entries.len(),
        schedule.holidays.len(),
        range.start,
        range.end
    );

    Ok(ScheduleSnapshot {
        range,
        groups,
        entries,
        holidays: schedule.holidays,
        projects,
        contractors,
        users,
        loaded_at: Some(Utc::now()),
    })
}
