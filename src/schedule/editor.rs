//! Working copy of one grid cell while it is open for editing.
//!
//! The editor is the only mutable view of schedule data. Nothing here talks to the
//! backend; [`super::reconcile`] turns the final state into writes.

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::{
    helpers::non_blank, Assignment, EntryType, LeaveType, ScheduleEntry, Subject, TimeSlot,
};

/// Editable content of one time slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotContent {
    pub entry_type: EntryType,
    pub project_id: Option<String>,
    pub leave_type: Option<LeaveType>,
    pub description: String,
    pub notes: String,
}

impl Default for SlotContent {
    fn default() -> Self {
        Self {
            entry_type: EntryType::Project,
            project_id: None,
            leave_type: None,
            description: String::new(),
            notes: String::new(),
        }
    }
}

impl SlotContent {
    pub fn from_entry(entry: &ScheduleEntry) -> Self {
        Self {
            entry_type: entry.entry_type(),
            project_id: entry.assignment.project_id().map(str::to_string),
            leave_type: entry.assignment.leave_type(),
            description: entry.description.clone().unwrap_or_default(),
            notes: entry.notes.clone().unwrap_or_default(),
        }
    }

    /// The typed assignment, or `None` while the type still lacks its project or leave
    /// category.
    pub fn assignment(&self) -> Option<Assignment> {
        Assignment::from_parts(self.entry_type, self.project_id.clone(), self.leave_type)
    }

    /// A slot is occupied once its entry type is complete: a project slot needs a
    /// project, a leave slot needs a leave category, other types need nothing.
    pub fn is_occupied(&self) -> bool {
        self.assignment().is_some()
    }

    pub fn description_text(&self) -> Option<String> {
        non_blank(Some(self.description.clone()))
    }

    pub fn notes_text(&self) -> Option<String> {
        non_blank(Some(self.notes.clone()))
    }

    /// Whether saving this content over `entry` would change nothing.
    pub fn matches_entry(&self, entry: &ScheduleEntry) -> bool {
        self.assignment().as_ref() == Some(&entry.assignment)
            && self.description_text() == non_blank(entry.description.clone())
            && self.notes_text() == non_blank(entry.notes.clone())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotState {
    pub content: SlotContent,
    /// The persisted entry this slot was seeded from, if any.
    pub original: Option<ScheduleEntry>,
}

impl SlotState {
    pub fn persisted_id(&self) -> Option<&str> {
        self.original.as_ref().map(|entry| entry.id.as_str())
    }

    pub fn is_occupied(&self) -> bool {
        self.content.is_occupied()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotEditor {
    subject: Subject,
    date: NaiveDate,
    slots: [SlotState; 4],
    active: TimeSlot,
}

impl SlotEditor {
    /// Seeds the four slots from the cell's persisted entries. Slots without an entry
    /// start empty; AM1 is active.
    pub fn open(subject: Subject, date: NaiveDate, entries: &[&ScheduleEntry]) -> Self {
        let mut slots: [SlotState; 4] = Default::default();
        for entry in entries {
            if entry.date != date || entry.subject.id() != subject.id() {
                continue;
            }
            slots[entry.time_slot.index()] = SlotState {
                content: SlotContent::from_entry(entry),
                original: Some((*entry).clone()),
            };
        }

        Self {
            subject,
            date,
            slots,
            active: TimeSlot::Am1,
        }
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn active_slot(&self) -> TimeSlot {
        self.active
    }

    pub fn select_slot(&mut self, slot: TimeSlot) {
        self.active = slot;
    }

    pub fn slot(&self, slot: TimeSlot) -> &SlotState {
        &self.slots[slot.index()]
    }

    pub fn slots(&self) -> impl Iterator<Item = (TimeSlot, &SlotState)> {
        TimeSlot::ALL.into_iter().map(move |slot| (slot, &self.slots[slot.index()]))
    }

    pub fn content(&self, slot: TimeSlot) -> &SlotContent {
        &self.slots[slot.index()].content
    }

    fn content_mut(&mut self, slot: TimeSlot) -> &mut SlotContent {
        &mut self.slots[slot.index()].content
    }

    pub fn occupied_slots(&self) -> impl Iterator<Item = (TimeSlot, &SlotContent)> {
        self.slots()
            .filter(|(_, state)| state.is_occupied())
            .map(|(slot, state)| (slot, &state.content))
    }

    /// True when saving would write or delete something.
    pub fn is_dirty(&self) -> bool {
        self.slots().any(|(_, state)| match &state.original {
            Some(entry) => !state.content.matches_entry(entry),
            None => state.is_occupied(),
        })
    }

    /// Changing the type drops whichever reference the new type cannot carry.
    pub fn set_entry_type(&mut self, slot: TimeSlot, entry_type: EntryType) {
        let content = self.content_mut(slot);
        if content.entry_type == entry_type {
            return;
        }
        content.entry_type = entry_type;
        if entry_type != EntryType::Project {
            content.project_id = None;
        }
        if entry_type != EntryType::Leave {
            content.leave_type = None;
        }
    }

    pub fn set_project(&mut self, slot: TimeSlot, project_id: Option<String>) {
        let content = self.content_mut(slot);
        content.entry_type = EntryType::Project;
        content.leave_type = None;
        content.project_id = project_id;
    }

    pub fn set_leave_type(&mut self, slot: TimeSlot, leave_type: Option<LeaveType>) {
        let content = self.content_mut(slot);
        content.entry_type = EntryType::Leave;
        content.project_id = None;
        content.leave_type = leave_type;
    }

    pub fn set_description(&mut self, slot: TimeSlot, description: impl Into<String>) {
        self.content_mut(slot).description = description.into();
    }

    pub fn set_notes(&mut self, slot: TimeSlot, notes: impl Into<String>) {
        self.content_mut(slot).notes = notes.into();
    }

    pub fn set_content(&mut self, slot: TimeSlot, content: SlotContent) {
        *self.content_mut(slot) = content;
    }

    /// Copies the active slot's content into all four slots. Persisted ids stay with
    /// their slots so the save updates rather than duplicates.
    pub fn fill_day(&mut self) {
        let source = self.content(self.active).clone();
        for state in self.slots.iter_mut() {
            state.content = source.clone();
        }
    }

    /// Copies the active slot's content into the slots that are not occupied.
    pub fn fill_empty_slots(&mut self) {
        let source = self.content(self.active).clone();
        for state in self.slots.iter_mut() {
            if !state.is_occupied() {
                state.content = source.clone();
            }
        }
    }

    pub fn clear_day(&mut self) {
        for state in self.slots.iter_mut() {
            state.content = SlotContent::default();
        }
    }

    pub fn clear_slot(&mut self, slot: TimeSlot) {
        *self.content_mut(slot) = SlotContent::default();
    }
}
