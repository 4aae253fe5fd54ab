//! Group membership and contractor maintenance.
//!
//! Every operation validates against the loaded snapshot before touching the backend
//! and reloads the grid after a successful write.

use anyhow::{Context, Result};

use crate::{
    db::{
        helpers::non_blank, Contractor, ContractorDraft, ContractorRemoval, GroupMember,
        MemberDraft,
    },
    log_info,
};

use super::{backend::ScheduleBackend, error::ValidationError, session::ScheduleSession};

const ENABLE_LOGS: bool = true;

/// Checks a contractor draft and returns it with its text fields trimmed.
pub fn validate_contractor(draft: ContractorDraft) -> Result<ContractorDraft, ValidationError> {
    let name = draft.name.trim().to_string();
    if name.is_empty() {
        return Err(ValidationError::MissingContractorName);
    }

    let email = non_blank(draft.email);
    if let Some(email) = &email {
        if !email.contains('@') {
            return Err(ValidationError::InvalidEmail(email.clone()));
        }
    }

    Ok(ContractorDraft {
        id: non_blank(draft.id),
        name,
        company: non_blank(draft.company),
        phone: non_blank(draft.phone),
        email,
        category: draft.category,
        notes: non_blank(draft.notes),
    })
}

impl ScheduleSession {
    pub async fn add_member(
        &mut self,
        backend: &dyn ScheduleBackend,
        draft: MemberDraft,
    ) -> Result<GroupMember> {
        let group_id = non_blank(draft.group_id).ok_or(ValidationError::MissingGroup)?;
        let subject = draft
            .subject
            .filter(|subject| !subject.id().trim().is_empty())
            .ok_or(ValidationError::MissingSubject)?;

        let group = self
            .snapshot()
            .group(&group_id)
            .ok_or_else(|| ValidationError::UnknownGroup(group_id.clone()))?;
        if group.has_member(&subject) {
            return Err(ValidationError::DuplicateMember(subject.id().to_string()).into());
        }

        let member = backend
            .add_group_member(&group_id, subject, non_blank(draft.role_label))
            .await
            .context("failed to add group member")?;
        log_info!("Added {} to group {group_id}", member.subject.id());

        self.refresh(backend).await;
        Ok(member)
    }

    pub async fn remove_member(
        &mut self,
        backend: &dyn ScheduleBackend,
        member_id: &str,
    ) -> Result<()> {
        backend
            .remove_group_member(member_id)
            .await
            .with_context(|| format!("failed to remove group member {member_id}"))?;
        self.refresh(backend).await;
        Ok(())
    }

    /// A blank role clears the label.
    pub async fn update_member_role(
        &mut self,
        backend: &dyn ScheduleBackend,
        member_id: &str,
        role_label: Option<String>,
    ) -> Result<()> {
        backend
            .update_member_role(member_id, non_blank(role_label))
            .await
            .with_context(|| format!("failed to update role of member {member_id}"))?;
        self.refresh(backend).await;
        Ok(())
    }

    /// Creates the contractor when the draft has no id, otherwise updates it.
    pub async fn save_contractor(
        &mut self,
        backend: &dyn ScheduleBackend,
        draft: ContractorDraft,
    ) -> Result<Contractor> {
        let draft = validate_contractor(draft)?;
        let contractor = backend
            .save_contractor(draft)
            .await
            .context("failed to save contractor")?;
        log_info!("Saved contractor {}", contractor.id);

        self.refresh(backend).await;
        Ok(contractor)
    }

    pub async fn remove_contractor(
        &mut self,
        backend: &dyn ScheduleBackend,
        contractor_id: &str,
    ) -> Result<ContractorRemoval> {
        let removal = backend
            .remove_contractor(contractor_id)
            .await
            .with_context(|| format!("failed to remove contractor {contractor_id}"))?;
        log_info!("Contractor {contractor_id}: {removal:?}");

        self.refresh(backend).await;
        Ok(removal)
    }

    /// Notes are not part of the grid, so no reload follows.
    pub async fn update_user_note(
        &mut self,
        backend: &dyn ScheduleBackend,
        user_id: &str,
        note: Option<String>,
    ) -> Result<()> {
        backend
            .update_user_note(user_id, non_blank(note))
            .await
            .with_context(|| format!("failed to update note for user {user_id}"))
    }
}
