use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::{
    calendar::DateRange,
    db::{
        connection::Database,
        helpers::{
            format_date, parse_date, parse_entry_type, parse_leave_type, parse_subject,
            parse_time_slot,
        },
        models::{Assignment, EntryDraft, PublicHoliday, ScheduleData, ScheduleEntry, WriteMode},
    },
};

const ENTRY_COLUMNS: &str = "id, entry_date, time_slot, subject_kind, subject_id, entry_type, \
                             project_id, leave_type, description, notes";

fn row_to_entry(row: &Row) -> Result<ScheduleEntry> {
    let entry_date: String = row.get("entry_date")?;
    let time_slot: String = row.get("time_slot")?;
    let subject_kind: String = row.get("subject_kind")?;
    let entry_type: String = row.get("entry_type")?;
    let project_id: Option<String> = row.get("project_id")?;
    let leave_type: Option<String> = row.get("leave_type")?;
    let id: String = row.get("id")?;

    let entry_type = parse_entry_type(&entry_type)?;
    let leave_type = leave_type.as_deref().map(parse_leave_type).transpose()?;
    let assignment = Assignment::from_parts(entry_type, project_id, leave_type)
        .ok_or_else(|| anyhow!("schedule entry {id} is missing its {} payload", entry_type.as_str()))?;

    Ok(ScheduleEntry {
        date: parse_date(&entry_date, "entry_date")?,
        time_slot: parse_time_slot(&time_slot)?,
        subject: parse_subject(&subject_kind, row.get("subject_id")?)?,
        assignment,
        description: row.get("description")?,
        notes: row.get("notes")?,
        id,
    })
}

fn write_entry(conn: &Connection, draft: &EntryDraft, mode: WriteMode) -> Result<ScheduleEntry> {
    let now = Utc::now().to_rfc3339();
    let entry_date = format_date(draft.date);
    let insert = format!(
        "INSERT INTO schedule_entries ({ENTRY_COLUMNS}, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)"
    );
    let statement = match mode {
        WriteMode::Insert => insert,
        WriteMode::Upsert => format!(
            "{insert}
             ON CONFLICT (entry_date, time_slot, subject_kind, subject_id) DO UPDATE SET
                 entry_type = excluded.entry_type,
                 project_id = excluded.project_id,
                 leave_type = excluded.leave_type,
                 description = excluded.description,
                 notes = excluded.notes,
                 updated_at = excluded.updated_at"
        ),
    };

    conn.execute(
        &statement,
        params![
            Uuid::new_v4().to_string(),
            entry_date,
            draft.time_slot.as_str(),
            draft.subject.kind().as_str(),
            draft.subject.id(),
            draft.assignment.entry_type().as_str(),
            draft.assignment.project_id(),
            draft.assignment.leave_type().map(|leave| leave.as_str()),
            draft.description,
            draft.notes,
            now,
        ],
    )
    .with_context(|| {
        format!(
            "failed to write {} entry for {} on {}",
            draft.time_slot.as_str(),
            draft.subject.id(),
            entry_date
        )
    })?;

    // The conflict path keeps the existing id, so read the row back by natural key.
    let query = format!(
        "SELECT {ENTRY_COLUMNS} FROM schedule_entries
         WHERE entry_date = ?1 AND time_slot = ?2 AND subject_kind = ?3 AND subject_id = ?4"
    );
    let mut stmt = conn.prepare(&query)?;
    let mut rows = stmt.query(params![
        entry_date,
        draft.time_slot.as_str(),
        draft.subject.kind().as_str(),
        draft.subject.id(),
    ])?;
    let row = rows
        .next()?
        .ok_or_else(|| anyhow!("schedule entry not found after write"))?;
    row_to_entry(row)
}

impl Database {
    /// Entries and public holidays whose date falls inside `range`.
    pub async fn get_schedule_data(&self, range: DateRange) -> Result<ScheduleData> {
        self.execute(move |conn| {
            let start = format_date(range.start);
            let end = format_date(range.end);

            let query = format!(
                "SELECT {ENTRY_COLUMNS} FROM schedule_entries
                 WHERE entry_date BETWEEN ?1 AND ?2
                 ORDER BY entry_date ASC, time_slot ASC"
            );
            let mut stmt = conn.prepare(&query)?;
            let mut rows = stmt.query(params![start, end])?;
            let mut entries = Vec::new();
            while let Some(row) = rows.next()? {
                entries.push(row_to_entry(row)?);
            }

            let mut stmt = conn.prepare(
                "SELECT holiday_date, name FROM public_holidays
                 WHERE holiday_date BETWEEN ?1 AND ?2
                 ORDER BY holiday_date ASC",
            )?;
            let mut rows = stmt.query(params![start, end])?;
            let mut holidays = Vec::new();
            while let Some(row) = rows.next()? {
                let date: String = row.get(0)?;
                holidays.push(PublicHoliday {
                    date: parse_date(&date, "holiday_date")?,
                    name: row.get(1)?,
                });
            }

            Ok(ScheduleData { entries, holidays })
        })
        .await
    }

    /// Writes a batch of entries in one transaction. Either every draft lands or none do.
    pub async fn upsert_schedule_entries(
        &self,
        drafts: Vec<EntryDraft>,
        mode: WriteMode,
    ) -> Result<Vec<ScheduleEntry>> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        self.transact("schedule entry batch", move |tx| {
            drafts
                .iter()
                .map(|draft| write_entry(tx, draft, mode))
                .collect()
        })
        .await
    }

    pub async fn delete_schedule_entry(&self, entry_id: &str) -> Result<()> {
        let entry_id = entry_id.to_string();
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "DELETE FROM schedule_entries WHERE id = ?1",
                params![entry_id],
            )?;

            if rows_affected == 0 {
                bail!("schedule entry {entry_id} not found");
            }
            Ok(())
        })
        .await
    }

    pub async fn get_schedule_entry(&self, entry_id: &str) -> Result<Option<ScheduleEntry>> {
        let entry_id = entry_id.to_string();
        self.execute(move |conn| {
            let query = format!("SELECT {ENTRY_COLUMNS} FROM schedule_entries WHERE id = ?1");
            let mut stmt = conn.prepare(&query)?;
            let mut rows = stmt.query(params![entry_id])?;
            let entry = match rows.next()? {
                Some(row) => Some(row_to_entry(row)?),
                None => None,
            };
            Ok(entry)
        })
        .await
    }

    /// Adds or renames the holiday on `holiday.date`.
    pub async fn put_public_holiday(&self, holiday: PublicHoliday) -> Result<()> {
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO public_holidays (holiday_date, name) VALUES (?1, ?2)
                 ON CONFLICT (holiday_date) DO UPDATE SET name = excluded.name",
                params![format_date(holiday.date), holiday.name],
            )
            .context("failed to save public holiday")?;
            Ok(())
        })
        .await
    }

    pub async fn remove_public_holiday(&self, date: NaiveDate) -> Result<bool> {
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "DELETE FROM public_holidays WHERE holiday_date = ?1",
                params![format_date(date)],
            )?;
            Ok(rows_affected > 0)
        })
        .await
    }
}
