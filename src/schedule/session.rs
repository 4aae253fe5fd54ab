//! Page state of the scheduling grid.
//!
//! A [`ScheduleSession`] owns the navigation cursor, the loaded snapshot and at most
//! one open [`SlotEditor`]. The backend is passed into every async call rather than
//! stored, so the same session can be driven against SQLite or a test double.

use anyhow::Result;
use chrono::NaiveDate;

use crate::{
    calendar::{shift_cursor, visible_days, visible_range, DateRange, ViewMode},
    db::Subject,
    log_info, log_warn,
    settings::GridSettings,
};

use super::{
    backend::ScheduleBackend,
    editor::SlotEditor,
    error::ValidationError,
    propagate::{apply_propagation, plan_propagation, PropagationReport},
    reconcile::{apply_save, plan_save, SaveReport, SoftFailure},
    render::{summarize_cell, CellView},
    store::{load_snapshot, ScheduleSnapshot},
};

const ENABLE_LOGS: bool = true;

pub struct ScheduleSession {
    cursor: NaiveDate,
    view_mode: ViewMode,
    show_weekends: bool,
    range: DateRange,
    snapshot: ScheduleSnapshot,
    load_error: Option<String>,
    editor: Option<SlotEditor>,
    editor_error: Option<String>,
    warnings: Vec<SoftFailure>,
    settings: GridSettings,
}

impl ScheduleSession {
    /// Starts unloaded at `cursor`; call [`ScheduleSession::reload`] to fetch data.
    pub fn new(cursor: NaiveDate, settings: GridSettings) -> Self {
        let range = visible_range(cursor, settings.view_mode);
        Self {
            cursor,
            view_mode: settings.view_mode,
            show_weekends: settings.show_weekends,
            range,
            snapshot: ScheduleSnapshot::empty(range),
            load_error: None,
            editor: None,
            editor_error: None,
            warnings: Vec::new(),
            settings,
        }
    }

    pub fn cursor(&self) -> NaiveDate {
        self.cursor
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn show_weekends(&self) -> bool {
        self.show_weekends
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    /// The last snapshot that loaded successfully. Its range can lag behind
    /// [`ScheduleSession::range`] after a failed reload.
    pub fn snapshot(&self) -> &ScheduleSnapshot {
        &self.snapshot
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn editor_error(&self) -> Option<&str> {
        self.editor_error.as_deref()
    }

    /// Current grid preferences, including the live weekend and view-mode toggles.
    pub fn grid_settings(&self) -> GridSettings {
        GridSettings {
            show_weekends: self.show_weekends,
            view_mode: self.view_mode,
            ..self.settings.clone()
        }
    }

    /// Replaces the snapshot for the current range. On failure the previous snapshot
    /// stays on screen and the error is kept in `load_error`.
    pub async fn reload(&mut self, backend: &dyn ScheduleBackend) -> Result<()> {
        match load_snapshot(backend, self.range).await {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                self.load_error = None;
                Ok(())
            }
            Err(err) => {
                log_warn!("Failed to load schedule: {err:#}");
                self.load_error = Some(format!("{err:#}"));
                Err(err)
            }
        }
    }

    /// Reload after a successful write. The write already happened, so a failed
    /// refresh only shows up as `load_error`.
    pub(super) async fn refresh(&mut self, backend: &dyn ScheduleBackend) {
        if self.reload(backend).await.is_err() {
            log_warn!("Schedule is stale until the next successful reload");
        }
    }

    /// Moves the cursor, discarding any open editor, and loads the new range.
    pub async fn navigate_to(
        &mut self,
        backend: &dyn ScheduleBackend,
        date: NaiveDate,
    ) -> Result<()> {
        self.cursor = date;
        self.range = visible_range(date, self.view_mode);
        self.close_cell();
        self.reload(backend).await
    }

    /// Pages one week or one month forward or back.
    pub async fn step(&mut self, backend: &dyn ScheduleBackend, forward: bool) -> Result<()> {
        let Some(next) = shift_cursor(self.cursor, self.view_mode, forward) else {
            anyhow::bail!("cannot move past {}", self.cursor);
        };
        self.navigate_to(backend, next).await
    }

    pub async fn set_view_mode(
        &mut self,
        backend: &dyn ScheduleBackend,
        mode: ViewMode,
    ) -> Result<()> {
        if mode == self.view_mode {
            return Ok(());
        }
        self.view_mode = mode;
        let cursor = self.cursor;
        self.navigate_to(backend, cursor).await
    }

    /// Only changes which columns are shown; the loaded range already covers weekends.
    pub fn set_show_weekends(&mut self, show: bool) {
        self.show_weekends = show;
    }

    pub fn visible_days(&self) -> Vec<NaiveDate> {
        visible_days(self.cursor, self.view_mode, self.show_weekends)
    }

    pub fn cell_view(&self, subject_id: &str, date: NaiveDate) -> CellView {
        summarize_cell(&self.snapshot, subject_id, date, &self.grid_settings())
    }

    /// Whether the current snapshot actually holds `date`. After a failed reload the
    /// range has moved on but the snapshot has not.
    fn has_loaded(&self, date: NaiveDate) -> bool {
        self.load_error.is_none()
            && self.snapshot.is_loaded()
            && self.snapshot.range.contains(date)
    }

    pub fn is_editable(&self, date: NaiveDate) -> bool {
        self.range.contains(date)
            && self.has_loaded(date)
            && self.snapshot.holiday_for(date).is_none()
    }

    /// Opens the editor on one cell, seeded from the snapshot. Replaces any editor
    /// already open without saving it. Refuses cells whose entries are not loaded, so
    /// a save can never overwrite rows it has not seen.
    pub fn open_cell(
        &mut self,
        subject: Subject,
        date: NaiveDate,
    ) -> Result<&mut SlotEditor, ValidationError> {
        if !self.range.contains(date) {
            return Err(ValidationError::OutsideRange(date));
        }
        if !self.has_loaded(date) {
            return Err(ValidationError::NotLoaded(date));
        }
        if let Some(holiday) = self.snapshot.holiday_for(date) {
            return Err(ValidationError::HolidayLocked(date, holiday.name.clone()));
        }

        let entries = self.snapshot.entries_for_cell(subject.id(), date);
        let editor = SlotEditor::open(subject, date, &entries);
        self.editor_error = None;
        Ok(self.editor.insert(editor))
    }

    pub fn editor(&self) -> Option<&SlotEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut SlotEditor> {
        self.editor.as_mut()
    }

    pub fn close_cell(&mut self) {
        self.editor = None;
        self.editor_error = None;
    }

    /// Saves the open cell. On success the editor closes and the grid reloads; when
    /// the upsert fails the editor stays open with `editor_error` set.
    pub async fn save_cell(&mut self, backend: &dyn ScheduleBackend) -> Result<SaveReport> {
        let editor = self.editor.as_ref().ok_or(ValidationError::NoOpenCell)?;
        let plan = plan_save(editor);

        if plan.is_empty() {
            self.close_cell();
            return Ok(SaveReport::default());
        }

        let report = match apply_save(backend, plan).await {
            Ok(report) => report,
            Err(err) => {
                self.editor_error = Some(format!("{err:#}"));
                return Err(err);
            }
        };

        self.warnings.extend(report.warnings.iter().cloned());
        self.close_cell();
        self.refresh(backend).await;
        Ok(report)
    }

    /// Copies the open cell to the rest of its week. The editor stays open either way.
    pub async fn propagate_week(
        &mut self,
        backend: &dyn ScheduleBackend,
    ) -> Result<PropagationReport> {
        let editor = self.editor.as_ref().ok_or(ValidationError::NoOpenCell)?;
        let plan = plan_propagation(editor, self.show_weekends);

        match apply_propagation(backend, plan).await {
            Ok(report) => {
                self.editor_error = None;
                if report.upserted.is_empty() {
                    log_info!("Nothing to copy from the open cell");
                } else {
                    self.refresh(backend).await;
                }
                Ok(report)
            }
            Err(err) => {
                self.editor_error = Some(format!("{err:#}"));
                Err(err)
            }
        }
    }

    /// Drains the delete failures collected since the last call.
    pub fn take_warnings(&mut self) -> Vec<SoftFailure> {
        std::mem::take(&mut self.warnings)
    }
}
