//! The persistence boundary of the scheduler.
//!
//! Everything the scheduling core reads or writes goes through [`ScheduleBackend`].
//! [`Database`] is the production implementation; tests substitute recording doubles.

use anyhow::Result;
use async_trait::async_trait;

use crate::{
    calendar::DateRange,
    db::{
        Contractor, ContractorDraft, ContractorRemoval, Database, EntryDraft, GroupMember,
        Project, ScheduleData, ScheduleEntry, Subject, TechnicianGroup, User, WriteMode,
    },
};

#[async_trait]
pub trait ScheduleBackend: Send + Sync {
    async fn fetch_groups(&self) -> Result<Vec<TechnicianGroup>>;

    /// Entries and holidays dated inside `range`.
    async fn fetch_schedule(&self, range: DateRange) -> Result<ScheduleData>;

    /// Projects that are not completed.
    async fn fetch_projects(&self) -> Result<Vec<Project>>;

    /// Contractors that can be scheduled.
    async fn fetch_contractors(&self) -> Result<Vec<Contractor>>;

    /// Technicians, for row titles.
    async fn fetch_users(&self) -> Result<Vec<User>>;

    /// Writes a batch keyed by `(date, time_slot, subject)`.
    async fn upsert_entries(
        &self,
        entries: Vec<EntryDraft>,
        mode: WriteMode,
    ) -> Result<Vec<ScheduleEntry>>;

    async fn delete_entry(&self, entry_id: &str) -> Result<()>;

    async fn add_group_member(
        &self,
        group_id: &str,
        subject: Subject,
        role_label: Option<String>,
    ) -> Result<GroupMember>;

    async fn remove_group_member(&self, member_id: &str) -> Result<()>;

    async fn update_member_role(&self, member_id: &str, role_label: Option<String>)
        -> Result<()>;

    async fn save_contractor(&self, draft: ContractorDraft) -> Result<Contractor>;

    async fn remove_contractor(&self, contractor_id: &str) -> Result<ContractorRemoval>;

    async fn update_user_note(&self, user_id: &str, note: Option<String>) -> Result<()>;
}

#[async_trait]
impl ScheduleBackend for Database {
    async fn fetch_groups(&self) -> Result<Vec<TechnicianGroup>> {
        self.get_groups().await
    }

    async fn fetch_schedule(&self, range: DateRange) -> Result<ScheduleData> {
        self.get_schedule_data(range).await
    }

    async fn fetch_projects(&self) -> Result<Vec<Project>> {
        self.get_eligible_projects().await
    }

    async fn fetch_contractors(&self) -> Result<Vec<Contractor>> {
        self.get_active_contractors().await
    }

    async fn fetch_users(&self) -> Result<Vec<User>> {
        self.get_users().await
    }

    async fn upsert_entries(
        &self,
        entries: Vec<EntryDraft>,
        mode: WriteMode,
    ) -> Result<Vec<ScheduleEntry>> {
        self.upsert_schedule_entries(entries, mode).await
    }

    async fn delete_entry(&self, entry_id: &str) -> Result<()> {
        self.delete_schedule_entry(entry_id).await
    }

    async fn add_group_member(
        &self,
        group_id: &str,
        subject: Subject,
        role_label: Option<String>,
    ) -> Result<GroupMember> {
        self.insert_group_member(group_id, subject, role_label).await
    }

    async fn remove_group_member(&self, member_id: &str) -> Result<()> {
        self.delete_group_member(member_id).await
    }

    async fn update_member_role(
        &self,
        member_id: &str,
        role_label: Option<String>,
    ) -> Result<()> {
        self.set_member_role(member_id, role_label).await
    }

    async fn save_contractor(&self, draft: ContractorDraft) -> Result<Contractor> {
        self.upsert_contractor(draft).await
    }

    async fn remove_contractor(&self, contractor_id: &str) -> Result<ContractorRemoval> {
        self.retire_contractor(contractor_id).await
    }

    async fn update_user_note(&self, user_id: &str, note: Option<String>) -> Result<()> {
        self.set_user_note(user_id, note).await
    }
}
