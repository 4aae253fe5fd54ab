//! Turns an edited cell into backend writes.
//!
//! Saving diffs the editor's four slots against the entries they were seeded from and
//! emits the smallest set of deletes and upserts. Deletes run first and are best
//! effort; the upsert batch is the part that must succeed.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    db::{EntryDraft, ScheduleEntry, Subject, TimeSlot, WriteMode},
    log_info, log_warn,
};

use super::{
    backend::ScheduleBackend,
    editor::{SlotContent, SlotEditor},
};

const ENABLE_LOGS: bool = true;

/// A delete that failed without failing the save. The row may come back on the
/// next reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftFailure {
    pub entry_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePlan {
    /// Persisted ids to remove, in slot order.
    pub deletes: Vec<String>,
    pub upserts: Vec<EntryDraft>,
}

impl SavePlan {
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.upserts.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReport {
    pub deleted: Vec<String>,
    pub upserted: Vec<ScheduleEntry>,
    pub warnings: Vec<SoftFailure>,
}

/// Builds the write for one occupied slot. Returns `None` for an unoccupied slot.
pub fn build_draft(
    subject: &Subject,
    date: NaiveDate,
    time_slot: TimeSlot,
    content: &SlotContent,
) -> Option<EntryDraft> {
    Some(EntryDraft {
        date,
        time_slot,
        subject: subject.clone(),
        assignment: content.assignment()?,
        description: content.description_text(),
        notes: content.notes_text(),
    })
}

/// Classifies each slot:
///
/// * occupied, no persisted entry: upsert
/// * occupied, persisted entry of the same type with different content: upsert
/// * occupied, persisted entry of another type: delete the old row, then upsert
/// * not occupied, persisted entry: delete
/// * anything unchanged: nothing
pub fn plan_save(editor: &SlotEditor) -> SavePlan {
    let mut plan = SavePlan::default();

    for (slot, state) in editor.slots() {
        let draft = build_draft(editor.subject(), editor.date(), slot, &state.content);

        match (draft, &state.original) {
            (Some(draft), None) => plan.upserts.push(draft),
            (Some(draft), Some(original)) => {
                if original.entry_type() != draft.assignment.entry_type() {
                    plan.deletes.push(original.id.clone());
                    plan.upserts.push(draft);
                } else if !state.content.matches_entry(original) {
                    plan.upserts.push(draft);
                }
            }
            (None, Some(original)) => plan.deletes.push(original.id.clone()),
            (None, None) => {}
        }
    }

    plan
}

/// Runs a plan: each delete individually, then one upsert batch.
///
/// A failed delete is recorded as a [`SoftFailure`] and the save carries on. A failed
/// upsert fails the save.
pub async fn apply_save(backend: &dyn ScheduleBackend, plan: SavePlan) -> Result<SaveReport> {
    let mut report = SaveReport::default();

    for entry_id in plan.deletes {
        match backend.delete_entry(&entry_id).await {
            Ok(()) => report.deleted.push(entry_id),
            Err(err) => {
                log_warn!("Failed to delete schedule entry {entry_id}: {err:#}");
                report.warnings.push(SoftFailure {
                    entry_id,
                    message: format!("{err:#}"),
                });
            }
        }
    }

    if !plan.upserts.is_empty() {
        let count = plan.upserts.len();
        report.upserted = backend
            .upsert_entries(plan.upserts, WriteMode::Upsert)
            .await
            .context("failed to save schedule entries")?;
        log_info!("Saved {count} schedule entries");
    }

    Ok(report)
}
