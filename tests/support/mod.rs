#![allow(dead_code)]

use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::NaiveDate;

use crewboard_lib::{
    calendar::DateRange,
    db::{
        Assignment, Contractor, ContractorDraft, ContractorRemoval, EntryDraft, GroupMember,
        Project, ProjectStatus, PublicHoliday, ScheduleData, ScheduleEntry, Subject,
        TechnicianGroup, TimeSlot, User, WriteMode,
    },
    schedule::ScheduleBackend,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchGroups,
    FetchSchedule(DateRange),
    FetchProjects,
    FetchContractors,
    FetchUsers,
    Upsert(Vec<EntryDraft>, WriteMode),
    Delete(String),
    AddMember(String, Subject),
    RemoveMember(String),
    UpdateRole(String, Option<String>),
    SaveContractor(String),
    RemoveContractor(String),
    UpdateNote(String, Option<String>),
}

#[derive(Default)]
struct State {
    groups: Vec<TechnicianGroup>,
    entries: Vec<ScheduleEntry>,
    holidays: Vec<PublicHoliday>,
    projects: Vec<Project>,
    users: Vec<User>,
    calls: Vec<Call>,
    fail_fetch: bool,
    fail_upsert: bool,
    fail_deletes: Vec<String>,
    next_id: u32,
}

/// In-memory backend that logs every call in order and can be told to fail.
#[derive(Default)]
pub struct RecordingBackend {
    state: Mutex<State>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(self, entries: Vec<ScheduleEntry>) -> Self {
        self.state.lock().unwrap().entries = entries;
        self
    }

    pub fn with_groups(self, groups: Vec<TechnicianGroup>) -> Self {
        self.state.lock().unwrap().groups = groups;
        self
    }

    pub fn with_holidays(self, holidays: Vec<PublicHoliday>) -> Self {
        self.state.lock().unwrap().holidays = holidays;
        self
    }

    pub fn with_projects(self, projects: Vec<Project>) -> Self {
        self.state.lock().unwrap().projects = projects;
        self
    }

    pub fn with_users(self, users: Vec<User>) -> Self {
        self.state.lock().unwrap().users = users;
        self
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.state.lock().unwrap().fail_fetch = fail;
    }

    pub fn fail_upserts(&self, fail: bool) {
        self.state.lock().unwrap().fail_upsert = fail;
    }

    pub fn fail_delete_of(&self, entry_id: &str) {
        self.state.lock().unwrap().fail_deletes.push(entry_id.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls other than the reads a reload makes.
    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| {
                !matches!(
                    call,
                    Call::FetchGroups
                        | Call::FetchSchedule(_)
                        | Call::FetchProjects
                        | Call::FetchContractors
                        | Call::FetchUsers
                )
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn entries(&self) -> Vec<ScheduleEntry> {
        self.state.lock().unwrap().entries.clone()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl ScheduleBackend for RecordingBackend {
    async fn fetch_groups(&self) -> Result<Vec<TechnicianGroup>> {
        self.record(Call::FetchGroups);
        let state = self.state.lock().unwrap();
        if state.fail_fetch {
            bail!("backend unavailable");
        }
        Ok(state.groups.clone())
    }

    async fn fetch_schedule(&self, range: DateRange) -> Result<ScheduleData> {
        self.record(Call::FetchSchedule(range));
        let state = self.state.lock().unwrap();
        if state.fail_fetch {
            bail!("backend unavailable");
        }
        Ok(ScheduleData {
            entries: state
                .entries
                .iter()
                .filter(|entry| range.contains(entry.date))
                .cloned()
                .collect(),
            holidays: state
                .holidays
                .iter()
                .filter(|holiday| range.contains(holiday.date))
                .cloned()
                .collect(),
        })
    }

    async fn fetch_projects(&self) -> Result<Vec<Project>> {
        self.record(Call::FetchProjects);
        Ok(self.state.lock().unwrap().projects.clone())
    }

    async fn fetch_contractors(&self) -> Result<Vec<Contractor>> {
        self.record(Call::FetchContractors);
        Ok(Vec::new())
    }

    async fn fetch_users(&self) -> Result<Vec<User>> {
        self.record(Call::FetchUsers);
        Ok(self.state.lock().unwrap().users.clone())
    }

    async fn upsert_entries(
        &self,
        entries: Vec<EntryDraft>,
        mode: WriteMode,
    ) -> Result<Vec<ScheduleEntry>> {
        self.record(Call::Upsert(entries.clone(), mode));
        let mut state = self.state.lock().unwrap();
        if state.fail_upsert {
            bail!("write rejected");
        }

        let mut written = Vec::new();
        for draft in entries {
            let key = draft.natural_key();
            let id = match state
                .entries
                .iter()
                .position(|entry| entry.natural_key() == key)
            {
                Some(index) => state.entries.remove(index).id,
                None => {
                    state.next_id += 1;
                    format!("gen-{}", state.next_id)
                }
            };
            let entry = ScheduleEntry {
                id,
                date: draft.date,
                time_slot: draft.time_slot,
                subject: draft.subject,
                assignment: draft.assignment,
                description: draft.description,
                notes: draft.notes,
            };
            state.entries.push(entry.clone());
            written.push(entry);
        }
        Ok(written)
    }

    async fn delete_entry(&self, entry_id: &str) -> Result<()> {
        self.record(Call::Delete(entry_id.to_string()));
        let mut state = self.state.lock().unwrap();
        if state.fail_deletes.iter().any(|id| id == entry_id) {
            bail!("row is locked");
        }
        state.entries.retain(|entry| entry.id != entry_id);
        Ok(())
    }

    async fn add_group_member(
        &self,
        group_id: &str,
        subject: Subject,
        role_label: Option<String>,
    ) -> Result<GroupMember> {
        self.record(Call::AddMember(group_id.to_string(), subject.clone()));
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let member = GroupMember {
            id: format!("member-{}", state.next_id),
            group_id: group_id.to_string(),
            subject,
            role_label,
            sort_order: 0,
        };
        if let Some(group) = state.groups.iter_mut().find(|group| group.id == group_id) {
            group.members.push(member.clone());
        }
        Ok(member)
    }

    async fn remove_group_member(&self, member_id: &str) -> Result<()> {
        self.record(Call::RemoveMember(member_id.to_string()));
        Ok(())
    }

    async fn update_member_role(&self, member_id: &str, role_label: Option<String>) -> Result<()> {
        self.record(Call::UpdateRole(member_id.to_string(), role_label));
        Ok(())
    }

    async fn save_contractor(&self, draft: ContractorDraft) -> Result<Contractor> {
        self.record(Call::SaveContractor(draft.name.clone()));
        Ok(Contractor {
            id: draft.id.unwrap_or_else(|| "c-new".to_string()),
            name: draft.name,
            company: draft.company,
            phone: draft.phone,
            email: draft.email,
            category: draft.category,
            notes: draft.notes,
            is_active: true,
        })
    }

    async fn remove_contractor(&self, contractor_id: &str) -> Result<ContractorRemoval> {
        self.record(Call::RemoveContractor(contractor_id.to_string()));
        Ok(ContractorRemoval::Deleted)
    }

    async fn update_user_note(&self, user_id: &str, note: Option<String>) -> Result<()> {
        self.record(Call::UpdateNote(user_id.to_string(), note));
        Ok(())
    }
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn technician(id: &str) -> Subject {
    Subject::Technician(id.to_string())
}

pub fn project_entry(id: &str, date: NaiveDate, slot: TimeSlot, project_id: &str) -> ScheduleEntry {
    ScheduleEntry {
        id: id.to_string(),
        date,
        time_slot: slot,
        subject: technician("u1"),
        assignment: Assignment::Project {
            project_id: project_id.to_string(),
        },
        description: None,
        notes: None,
    }
}

pub fn sample_user(id: &str, name: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: None,
        notes: None,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    }
}

pub fn sample_project(id: &str, name: &str) -> Project {
    Project {
        id: id.to_string(),
        name: name.to_string(),
        code: None,
        status: ProjectStatus::Active,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    }
}

pub fn installers(members: &[Subject]) -> TechnicianGroup {
    TechnicianGroup {
        id: "g1".to_string(),
        name: "Installers".to_string(),
        sort_order: 0,
        members: members
            .iter()
            .enumerate()
            .map(|(index, subject)| GroupMember {
                id: format!("m{index}"),
                group_id: "g1".to_string(),
                subject: subject.clone(),
                role_label: None,
                sort_order: index as i64,
            })
            .collect(),
    }
}
