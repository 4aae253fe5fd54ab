//! Copy-to-week: replays one day's slots onto the other days of its week.
//!
//! This is upsert-only. Target slots the source leaves empty are not cleared, and
//! target slots the source does not touch keep whatever they hold. Saving a single
//! cell does clear vacated slots; the two operations intentionally differ.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    calendar::week_targets,
    db::{EntryDraft, ScheduleEntry, WriteMode},
    log_info,
};

use super::{backend::ScheduleBackend, editor::SlotEditor, reconcile::build_draft};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropagationPlan {
    pub source: NaiveDate,
    pub targets: Vec<NaiveDate>,
    pub upserts: Vec<EntryDraft>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropagationReport {
    pub targets: Vec<NaiveDate>,
    pub upserted: Vec<ScheduleEntry>,
}

/// Builds one upsert per target day per occupied source slot, from the editor state as
/// it stands (saved or not). Only the weekend toggle narrows the targets; holiday
/// dates are written too and stay hidden behind the holiday overlay.
pub fn plan_propagation(editor: &SlotEditor, show_weekends: bool) -> PropagationPlan {
    let source = editor.date();
    let targets = week_targets(source, show_weekends);

    let upserts = targets
        .iter()
        .flat_map(|target| {
            editor.occupied_slots().filter_map(move |(slot, content)| {
                build_draft(editor.subject(), *target, slot, content)
            })
        })
        .collect();

    PropagationPlan {
        source,
        targets,
        upserts,
    }
}

/// Sends the whole plan as one bulk upsert. Whether a failure can leave part of the
/// week written depends on the backend; `Database` writes the batch in a transaction.
pub async fn apply_propagation(
    backend: &dyn ScheduleBackend,
    plan: PropagationPlan,
) -> Result<PropagationReport> {
    if plan.upserts.is_empty() {
        return Ok(PropagationReport {
            targets: plan.targets,
            upserted: Vec::new(),
        });
    }

    let count = plan.upserts.len();
    let upserted = backend
        .upsert_entries(plan.upserts, WriteMode::Upsert)
        .await
        .with_context(|| format!("failed to copy {} to the rest of the week", plan.source))?;

    log_info!(
        "Copied {} to {} days ({count} entries)",
        plan.source,
        plan.targets.len()
    );

    Ok(PropagationReport {
        targets: plan.targets,
        upserted,
    })
}
