use chrono::NaiveDate;

use crewboard_lib::{
    calendar::{visible_range, ViewMode},
    db::{
        Assignment, ContractorDraft, ContractorRemoval, Database, EntryDraft, LeaveType,
        ProjectStatus, PublicHoliday, Subject, TimeSlot, WriteMode,
    },
};

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn leave_draft(slot: TimeSlot, leave_type: LeaveType) -> EntryDraft {
    EntryDraft {
        date: monday(),
        time_slot: slot,
        subject: Subject::Technician("u1".into()),
        assignment: Assignment::Leave { leave_type },
        description: None,
        notes: None,
    }
}

#[tokio::test]
async fn upsert_updates_in_place_by_natural_key() {
    let db = Database::in_memory().unwrap();

    let first = db
        .upsert_schedule_entries(
            vec![leave_draft(TimeSlot::Am1, LeaveType::AnnualLeave)],
            WriteMode::Upsert,
        )
        .await
        .unwrap();
    let mut changed = leave_draft(TimeSlot::Am1, LeaveType::SickLeave);
    changed.notes = Some("doctor's certificate".into());
    let second = db
        .upsert_schedule_entries(vec![changed], WriteMode::Upsert)
        .await
        .unwrap();

    assert_eq!(first[0].id, second[0].id);
    assert_eq!(second[0].assignment.leave_type(), Some(LeaveType::SickLeave));

    let data = db
        .get_schedule_data(visible_range(monday(), ViewMode::Week))
        .await
        .unwrap();
    assert_eq!(data.entries.len(), 1);
    assert!(data.entries[0].has_notes());
}

#[tokio::test]
async fn insert_mode_rejects_a_taken_slot_atomically() {
    let db = Database::in_memory().unwrap();
    db.upsert_schedule_entries(
        vec![leave_draft(TimeSlot::Am1, LeaveType::AnnualLeave)],
        WriteMode::Insert,
    )
    .await
    .unwrap();

    let result = db
        .upsert_schedule_entries(
            vec![
                leave_draft(TimeSlot::Am2, LeaveType::AnnualLeave),
                leave_draft(TimeSlot::Am1, LeaveType::SickLeave),
            ],
            WriteMode::Insert,
        )
        .await;
    assert!(result.is_err());

    // the batch rolled back, AM2 was not written either
    let data = db
        .get_schedule_data(visible_range(monday(), ViewMode::Week))
        .await
        .unwrap();
    assert_eq!(data.entries.len(), 1);
    assert_eq!(data.entries[0].time_slot, TimeSlot::Am1);
}

#[tokio::test]
async fn project_entries_need_an_existing_project() {
    let db = Database::in_memory().unwrap();
    let draft = EntryDraft {
        assignment: Assignment::Project {
            project_id: "missing".into(),
        },
        ..leave_draft(TimeSlot::Pm1, LeaveType::AnnualLeave)
    };

    assert!(db
        .upsert_schedule_entries(vec![draft], WriteMode::Upsert)
        .await
        .is_err());
}

#[tokio::test]
async fn deleting_an_unknown_entry_fails() {
    let db = Database::in_memory().unwrap();
    let written = db
        .upsert_schedule_entries(
            vec![leave_draft(TimeSlot::Pm2, LeaveType::ParentalLeave)],
            WriteMode::Upsert,
        )
        .await
        .unwrap();

    db.delete_schedule_entry(&written[0].id).await.unwrap();
    assert!(db.get_schedule_entry(&written[0].id).await.unwrap().is_none());
    assert!(db.delete_schedule_entry(&written[0].id).await.is_err());
}

#[tokio::test]
async fn holidays_are_returned_with_the_range() {
    let db = Database::in_memory().unwrap();
    db.put_public_holiday(PublicHoliday {
        date: monday(),
        name: "Labour Day".into(),
    })
    .await
    .unwrap();
    db.put_public_holiday(PublicHoliday {
        date: NaiveDate::from_ymd_opt(2026, 12, 25).unwrap(),
        name: "Christmas Day".into(),
    })
    .await
    .unwrap();

    let data = db
        .get_schedule_data(visible_range(monday(), ViewMode::Week))
        .await
        .unwrap();
    assert_eq!(data.holidays.len(), 1);
    assert_eq!(data.holidays[0].name, "Labour Day");

    assert!(db.remove_public_holiday(monday()).await.unwrap());
    assert!(!db.remove_public_holiday(monday()).await.unwrap());
}

#[tokio::test]
async fn completed_projects_are_not_offered() {
    let db = Database::in_memory().unwrap();
    let active = db.create_project("Harbourview".into(), Some("HV-01".into())).await.unwrap();
    let done = db.create_project("Riverside".into(), None).await.unwrap();
    db.set_project_status(&done.id, ProjectStatus::Completed)
        .await
        .unwrap();

    let eligible = db.get_eligible_projects().await.unwrap();
    assert_eq!(eligible.len(), 1);
    assert_eq!(eligible[0].id, active.id);
}

#[tokio::test]
async fn referenced_contractors_are_only_deactivated() {
    let db = Database::in_memory().unwrap();
    let kept = db
        .upsert_contractor(ContractorDraft {
            name: "Sparky Electrical".into(),
            ..ContractorDraft::default()
        })
        .await
        .unwrap();
    let unused = db
        .upsert_contractor(ContractorDraft {
            name: "Drip Plumbing".into(),
            ..ContractorDraft::default()
        })
        .await
        .unwrap();

    let group = db.create_group("Subcontractors".into()).await.unwrap();
    db.insert_group_member(&group.id, Subject::Contractor(kept.id.clone()), None)
        .await
        .unwrap();

    assert_eq!(
        db.retire_contractor(&kept.id).await.unwrap(),
        ContractorRemoval::Deactivated
    );
    assert_eq!(
        db.retire_contractor(&unused.id).await.unwrap(),
        ContractorRemoval::Deleted
    );

    assert!(db.get_active_contractors().await.unwrap().is_empty());
    let all = db.list_contractors(true).await.unwrap();
    assert_eq!(all.len(), 1);
    assert!(!all[0].is_active);
}

#[tokio::test]
async fn group_members_keep_their_order() {
    let db = Database::in_memory().unwrap();
    let group = db.create_group("Installers".into()).await.unwrap();

    db.insert_group_member(&group.id, Subject::Technician("u1".into()), Some("Lead".into()))
        .await
        .unwrap();
    let second = db
        .insert_group_member(&group.id, Subject::Technician("u2".into()), None)
        .await
        .unwrap();
    assert!(db
        .insert_group_member(&group.id, Subject::Technician("u1".into()), None)
        .await
        .is_err());

    db.set_member_role(&second.id, Some("Apprentice".into()))
        .await
        .unwrap();

    let groups = db.get_groups().await.unwrap();
    assert_eq!(groups.len(), 1);
    let members = &groups[0].members;
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].subject.id(), "u1");
    assert_eq!(members[1].role_label.as_deref(), Some("Apprentice"));

    db.delete_group_member(&second.id).await.unwrap();
    assert_eq!(db.get_groups().await.unwrap()[0].members.len(), 1);
}

#[tokio::test]
async fn file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("schedule.sqlite3");

    {
        let db = Database::new(path.clone()).unwrap();
        assert_eq!(db.path(), Some(path.as_path()));
        let user = db.create_user("Ana".into(), None).await.unwrap();
        db.set_user_note(&user.id, Some("forklift licence".into()))
            .await
            .unwrap();
    }

    let reopened = Database::new(path).unwrap();
    let users = reopened.get_users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].notes.as_deref(), Some("forklift licence"));
}

#[tokio::test]
async fn failed_transaction_leaves_no_rows() {
    let db = Database::in_memory().unwrap();
    assert_eq!(db.path(), None);

    let result: anyhow::Result<()> = db
        .transact("holiday import", |tx| {
            tx.execute(
                "INSERT INTO public_holidays (holiday_date, name)
                 VALUES ('2026-10-19', 'Labour Day')",
                [],
            )?;
            anyhow::bail!("second row rejected")
        })
        .await;
    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("second row rejected"));

    let data = db
        .get_schedule_data(visible_range(monday(), ViewMode::Week))
        .await
        .unwrap();
    assert!(data.holidays.is_empty());
}
