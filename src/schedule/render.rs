//! Collapses a cell's entries into what the grid shows.

use std::fmt::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    db::{EntryType, GroupMember, LeaveType, ScheduleEntry, Subject, TimeSlot},
    settings::GridSettings,
};

use super::store::ScheduleSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellLabel {
    pub text: String,
    pub entry_type: EntryType,
    pub leave_type: Option<LeaveType>,
    pub has_notes: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CellView {
    /// The date is a public holiday. Entries on it are hidden, not removed.
    Holiday { name: String },
    Empty,
    /// One label stands for the whole cell.
    Compact { label: CellLabel },
    /// One optional label per time slot, in slot order.
    Mixed { slots: [Option<CellLabel>; 4] },
}

impl CellView {
    pub fn is_editable(&self) -> bool {
        !matches!(self, CellView::Holiday { .. })
    }

    /// Plain-text form used by the terminal grid.
    pub fn display(&self) -> String {
        match self {
            CellView::Holiday { name } => format!("[{name}]"),
            CellView::Empty => "·".to_string(),
            CellView::Compact { label } => display_label(label),
            CellView::Mixed { slots } => slots
                .iter()
                .map(|slot| slot.as_ref().map(display_label).unwrap_or_else(|| "-".into()))
                .collect::<Vec<_>>()
                .join("|"),
        }
    }
}

fn display_label(label: &CellLabel) -> String {
    if label.has_notes {
        format!("{}*", label.text)
    } else {
        label.text.clone()
    }
}

/// Cuts `text` to at most `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut truncated: String = text.chars().take(max_chars - 1).collect();
    truncated.push('…');
    truncated
}

fn label_text(snapshot: &ScheduleSnapshot, entry: &ScheduleEntry) -> String {
    if let Some(project_id) = entry.assignment.project_id() {
        return snapshot
            .project(project_id)
            .map(|project| project.name.clone())
            .unwrap_or_else(|| EntryType::Project.short_label().to_string());
    }
    if let Some(leave_type) = entry.assignment.leave_type() {
        return leave_type.short_label().to_string();
    }
    entry.entry_type().short_label().to_string()
}

fn cell_label(snapshot: &ScheduleSnapshot, entries: &[&ScheduleEntry], max_chars: usize) -> CellLabel {
    let first = entries[0];
    CellLabel {
        text: truncate_label(&label_text(snapshot, first), max_chars),
        entry_type: first.entry_type(),
        leave_type: first.assignment.leave_type(),
        has_notes: entries.iter().any(|entry| entry.has_notes()),
    }
}

/// Whether the four slots can be shown as one label: same entry type and, for project
/// work, the same project.
fn is_uniform(entries: &[&ScheduleEntry]) -> bool {
    if entries.len() != TimeSlot::ALL.len() {
        return false;
    }
    let first = entries[0];
    entries.iter().all(|entry| {
        entry.entry_type() == first.entry_type()
            && (first.entry_type() != EntryType::Project
                || entry.assignment.project_id() == first.assignment.project_id())
    })
}

/// Picks the cell presentation. A holiday beats everything; then empty; then a single
/// label for one entry or four uniform ones; otherwise a per-slot grid.
pub fn summarize_cell(
    snapshot: &ScheduleSnapshot,
    subject_id: &str,
    date: NaiveDate,
    settings: &GridSettings,
) -> CellView {
    if let Some(holiday) = snapshot.holiday_for(date) {
        return CellView::Holiday {
            name: holiday.name.clone(),
        };
    }

    let entries = snapshot.entries_for_cell(subject_id, date);
    if entries.is_empty() {
        return CellView::Empty;
    }

    if entries.len() == 1 || is_uniform(&entries) {
        return CellView::Compact {
            label: cell_label(snapshot, &entries, settings.compact_label_chars),
        };
    }

    let mut slots: [Option<CellLabel>; 4] = Default::default();
    for entry in &entries {
        slots[entry.time_slot.index()] =
            Some(cell_label(snapshot, &[*entry], settings.mini_label_chars));
    }
    CellView::Mixed { slots }
}

/// Row heading: the subject's name, falling back to its id, with the role when set.
fn row_title(snapshot: &ScheduleSnapshot, member: &GroupMember) -> String {
    let name = match &member.subject {
        Subject::Contractor(id) => snapshot
            .contractor(id)
            .map(|contractor| contractor.name.as_str()),
        Subject::Technician(id) => snapshot.user(id).map(|user| user.name.as_str()),
    };
    let name = name.unwrap_or_else(|| member.subject.id()).to_string();
    match &member.role_label {
        Some(role) => format!("{name} ({role})"),
        None => name,
    }
}

/// Plain-text grid of `days` for every group row in the snapshot.
pub fn render_text_grid(
    snapshot: &ScheduleSnapshot,
    days: &[NaiveDate],
    settings: &GridSettings,
) -> String {
    let width = settings.compact_label_chars.max(4 * settings.mini_label_chars + 3) + 2;
    let mut out = String::new();

    let _ = write!(out, "{:<24}", "");
    for day in days {
        let _ = write!(out, "{:<width$}", day.format("%a %d %b").to_string());
    }
    out.push('\n');

    let mut current_group = None;
    for (group, member) in snapshot.rows() {
        if current_group != Some(&group.id) {
            let _ = writeln!(out, "{}", group.name);
            current_group = Some(&group.id);
        }
        let title = truncate_label(&row_title(snapshot, member), 22);
        let _ = write!(out, "  {title:<22}");
        for day in days {
            let cell = summarize_cell(snapshot, member.subject.id(), *day, settings);
            let _ = write!(out, "{:<width$}", cell.display());
        }
        out.push('\n');
    }

    out
}
