use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::{
    connection::Database,
    helpers::{non_blank, parse_contractor_category},
    models::{Contractor, ContractorDraft, ContractorRemoval},
};

const CONTRACTOR_COLUMNS: &str = "id, name, company, phone, email, category, notes, is_active";

fn row_to_contractor(row: &Row) -> Result<Contractor> {
    let category: String = row.get("category")?;
    let is_active: i64 = row.get("is_active")?;

    Ok(Contractor {
        id: row.get("id")?,
        name: row.get("name")?,
        company: row.get("company")?,
        phone: row.get("phone")?,
        email: row.get("email")?,
        category: parse_contractor_category(&category)?,
        notes: row.get("notes")?,
        is_active: is_active != 0,
    })
}

fn load_contractor(conn: &Connection, contractor_id: &str) -> Result<Contractor> {
    let query = format!("SELECT {CONTRACTOR_COLUMNS} FROM contractors WHERE id = ?1");
    let mut stmt = conn.prepare(&query)?;
    let mut rows = stmt.query(params![contractor_id])?;
    let row = rows
        .next()?
        .ok_or_else(|| anyhow!("contractor {contractor_id} not found"))?;
    row_to_contractor(row)
}

impl Database {
    /// Contractors that can be scheduled, ordered by name.
    pub async fn get_active_contractors(&self) -> Result<Vec<Contractor>> {
        self.list_contractors(false).await
    }

    pub async fn list_contractors(&self, include_inactive: bool) -> Result<Vec<Contractor>> {
        self.execute(move |conn| {
            let query = format!(
                "SELECT {CONTRACTOR_COLUMNS} FROM contractors
                 WHERE is_active = 1 OR ?1
                 ORDER BY name COLLATE NOCASE ASC"
            );
            let mut stmt = conn.prepare(&query)?;
            let mut rows = stmt.query(params![include_inactive])?;
            let mut contractors = Vec::new();
            while let Some(row) = rows.next()? {
                contractors.push(row_to_contractor(row)?);
            }
            Ok(contractors)
        })
        .await
    }

    /// Creates a contractor when `draft.id` is empty, otherwise updates that contractor.
    /// Saving an inactive contractor reactivates it.
    pub async fn upsert_contractor(&self, draft: ContractorDraft) -> Result<Contractor> {
        self.execute(move |conn| {
            let now = Utc::now().to_rfc3339();
            let company = non_blank(draft.company);
            let phone = non_blank(draft.phone);
            let email = non_blank(draft.email);
            let notes = non_blank(draft.notes);
            let name = draft.name.trim().to_string();

            let id = match draft.id {
                Some(id) => {
                    let rows_affected = conn
                        .execute(
                            "UPDATE contractors
                             SET name = ?1, company = ?2, phone = ?3, email = ?4,
                                 category = ?5, notes = ?6, is_active = 1, updated_at = ?7
                             WHERE id = ?8",
                            params![
                                name,
                                company,
                                phone,
                                email,
                                draft.category.as_str(),
                                notes,
                                now,
                                id,
                            ],
                        )
                        .context("failed to update contractor")?;
                    if rows_affected == 0 {
                        return Err(anyhow!("contractor {id} not found"));
                    }
                    id
                }
                None => {
                    let id = Uuid::new_v4().to_string();
                    conn.execute(
                        "INSERT INTO contractors
                             (id, name, company, phone, email, category, notes, is_active,
                              created_at, updated_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)",
                        params![
                            id,
                            name,
                            company,
                            phone,
                            email,
                            draft.category.as_str(),
                            notes,
                            now,
                        ],
                    )
                    .context("failed to create contractor")?;
                    id
                }
            };

            load_contractor(conn, &id)
        })
        .await
    }

    /// Deletes a contractor outright unless schedule entries or group memberships still
    /// point at it, in which case it is only deactivated.
    pub async fn retire_contractor(&self, contractor_id: &str) -> Result<ContractorRemoval> {
        let contractor_id = contractor_id.to_string();
        self.transact("contractor removal", move |tx| {
            let references: i64 = tx.query_row(
                "SELECT
                     (SELECT COUNT(*) FROM schedule_entries
                      WHERE subject_kind = 'contractor' AND subject_id = ?1)
                   + (SELECT COUNT(*) FROM group_members
                      WHERE subject_kind = 'contractor' AND subject_id = ?1)",
                params![contractor_id],
                |row| row.get(0),
            )?;

            let (rows_affected, outcome) = if references > 0 {
                let rows_affected = tx.execute(
                    "UPDATE contractors SET is_active = 0, updated_at = ?1 WHERE id = ?2",
                    params![Utc::now().to_rfc3339(), contractor_id],
                )?;
                (rows_affected, ContractorRemoval::Deactivated)
            } else {
                let rows_affected = tx.execute(
                    "DELETE FROM contractors WHERE id = ?1",
                    params![contractor_id],
                )?;
                (rows_affected, ContractorRemoval::Deleted)
            };

            if rows_affected == 0 {
                return Err(anyhow!("contractor {contractor_id} not found"));
            }
            Ok(outcome)
        })
        .await
    }
}
