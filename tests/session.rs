mod support;

use crewboard_lib::{
    calendar::ViewMode,
    db::{PublicHoliday, TimeSlot},
    schedule::{CellView, ScheduleSession, ValidationError},
    settings::GridSettings,
};

use support::{
    day, installers, project_entry, sample_project, sample_user, technician, Call,
    RecordingBackend,
};

fn monday() -> chrono::NaiveDate {
    day(2026, 10, 19)
}

#[tokio::test]
async fn failed_reload_keeps_the_previous_snapshot() {
    let backend = RecordingBackend::new()
        .with_entries(vec![project_entry("e1", monday(), TimeSlot::Am1, "p1")]);
    let mut session = ScheduleSession::new(monday(), GridSettings::default());
    session.reload(&backend).await.unwrap();
    assert!(session.snapshot().is_loaded());

    backend.fail_fetches(true);
    let err = session.step(&backend, true).await.unwrap_err();

    assert!(format!("{err:#}").contains("backend unavailable"));
    assert!(session.load_error().is_some());
    // the cursor moved but the grid still shows last week's data
    assert_eq!(session.range().start, day(2026, 10, 26));
    assert_eq!(session.snapshot().range.start, monday());
    assert_eq!(session.snapshot().entries.len(), 1);

    backend.fail_fetches(false);
    session.reload(&backend).await.unwrap();
    assert!(session.load_error().is_none());
    assert_eq!(session.snapshot().range.start, day(2026, 10, 26));
}

#[tokio::test]
async fn unloaded_week_cannot_be_edited() {
    let next_monday = day(2026, 10, 26);
    let backend = RecordingBackend::new()
        .with_entries(vec![project_entry("e9", next_monday, TimeSlot::Am1, "p1")]);
    let mut session = ScheduleSession::new(monday(), GridSettings::default());
    session.reload(&backend).await.unwrap();

    backend.fail_fetches(true);
    session.step(&backend, true).await.unwrap_err();
    backend.clear_calls();

    // e9 was never loaded, so the cell must not open looking empty
    assert!(!session.is_editable(next_monday));
    assert_eq!(
        session.open_cell(technician("u1"), next_monday).unwrap_err(),
        ValidationError::NotLoaded(next_monday)
    );
    assert!(session.editor().is_none());
    assert!(backend.writes().is_empty());
    assert_eq!(backend.entries()[0].assignment.project_id(), Some("p1"));

    backend.fail_fetches(false);
    session.reload(&backend).await.unwrap();
    let editor = session.open_cell(technician("u1"), next_monday).unwrap();
    assert_eq!(editor.slot(TimeSlot::Am1).persisted_id(), Some("e9"));
}

#[tokio::test]
async fn cells_do_not_open_before_the_first_load() {
    let mut session = ScheduleSession::new(monday(), GridSettings::default());
    assert!(!session.is_editable(monday()));
    assert_eq!(
        session.open_cell(technician("u1"), monday()).unwrap_err(),
        ValidationError::NotLoaded(monday())
    );
}

#[tokio::test]
async fn holiday_cells_are_locked() {
    let backend = RecordingBackend::new()
        .with_entries(vec![project_entry("e1", monday(), TimeSlot::Am1, "p1")])
        .with_holidays(vec![PublicHoliday {
            date: monday(),
            name: "Labour Day".into(),
        }]);
    let mut session = ScheduleSession::new(monday(), GridSettings::default());
    session.reload(&backend).await.unwrap();

    assert_eq!(
        session.cell_view("u1", monday()),
        CellView::Holiday {
            name: "Labour Day".into()
        }
    );
    assert!(!session.is_editable(monday()));
    assert_eq!(
        session.open_cell(technician("u1"), monday()).unwrap_err(),
        ValidationError::HolidayLocked(monday(), "Labour Day".into())
    );
    assert!(session.is_editable(day(2026, 10, 20)));
}

#[tokio::test]
async fn cells_outside_the_range_cannot_open() {
    let backend = RecordingBackend::new();
    let mut session = ScheduleSession::new(monday(), GridSettings::default());
    session.reload(&backend).await.unwrap();

    let next_week = day(2026, 10, 27);
    assert_eq!(
        session.open_cell(technician("u1"), next_week).unwrap_err(),
        ValidationError::OutsideRange(next_week)
    );
}

#[tokio::test]
async fn month_view_loads_the_full_grid() {
    let backend = RecordingBackend::new();
    let mut session = ScheduleSession::new(monday(), GridSettings::default());
    session
        .set_view_mode(&backend, ViewMode::Month)
        .await
        .unwrap();

    let range = session.range();
    assert_eq!(range.start, day(2026, 9, 28));
    assert_eq!(range.len(), 42);
    assert!(backend.calls().contains(&Call::FetchSchedule(range)));

    session.set_show_weekends(false);
    assert_eq!(session.visible_days().len(), 30);
    session.set_show_weekends(true);
    assert_eq!(session.visible_days().len(), 42);
}

#[tokio::test]
async fn navigation_discards_the_open_editor() {
    let backend = RecordingBackend::new();
    let mut session = ScheduleSession::new(monday(), GridSettings::default());
    session.reload(&backend).await.unwrap();

    session.open_cell(technician("u1"), monday()).unwrap();
    session.step(&backend, false).await.unwrap();

    assert!(session.editor().is_none());
    assert_eq!(session.cursor(), day(2026, 10, 12));
}

#[tokio::test]
async fn saving_without_an_open_cell_is_rejected() {
    let backend = RecordingBackend::new();
    let mut session = ScheduleSession::new(monday(), GridSettings::default());

    let err = session.save_cell(&backend).await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::NoOpenCell)
    );
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn rows_follow_group_membership() {
    let backend = RecordingBackend::new()
        .with_groups(vec![installers(&[technician("u1"), technician("u2")])])
        .with_projects(vec![sample_project("p1", "Harbourview")])
        .with_users(vec![sample_user("u1", "Ana Ruiz")])
        .with_entries(vec![project_entry("e1", monday(), TimeSlot::Am1, "p1")]);
    let mut session = ScheduleSession::new(monday(), GridSettings::default());
    session.reload(&backend).await.unwrap();
    assert_eq!(session.snapshot().user("u1").unwrap().name, "Ana Ruiz");

    let rows: Vec<&str> = session
        .snapshot()
        .rows()
        .map(|(_, member)| member.subject.id())
        .collect();
    assert_eq!(rows, vec!["u1", "u2"]);

    let CellView::Compact { label } = session.cell_view("u1", monday()) else {
        panic!("expected a compact cell");
    };
    assert_eq!(label.text, "Harbourview");
    assert_eq!(session.cell_view("u2", monday()), CellView::Empty);
}
