use std::collections::HashMap;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::{
    connection::Database,
    helpers::parse_subject,
    models::{GroupMember, Subject, TechnicianGroup},
};

fn row_to_member(row: &Row) -> Result<GroupMember> {
    let subject_kind: String = row.get("subject_kind")?;

    Ok(GroupMember {
        id: row.get("id")?,
        group_id: row.get("group_id")?,
        subject: parse_subject(&subject_kind, row.get("subject_id")?)?,
        role_label: row.get("role_label")?,
        sort_order: row.get("sort_order")?,
    })
}

impl Database {
    /// All groups in display order, each with its members in display order.
    pub async fn get_groups(&self) -> Result<Vec<TechnicianGroup>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, sort_order FROM technician_groups
                 ORDER BY sort_order ASC, name ASC",
            )?;
            let mut groups = stmt
                .query_map([], |row| {
                    Ok(TechnicianGroup {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        sort_order: row.get(2)?,
                        members: Vec::new(),
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            let index: HashMap<String, usize> = groups
                .iter()
                .enumerate()
                .map(|(position, group)| (group.id.clone(), position))
                .collect();

            let mut stmt = conn.prepare(
                "SELECT id, group_id, subject_kind, subject_id, role_label, sort_order
                 FROM group_members
                 ORDER BY sort_order ASC, created_at ASC",
            )?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let member = row_to_member(row)?;
                if let Some(position) = index.get(&member.group_id) {
                    groups[*position].members.push(member);
                }
            }

            Ok(groups)
        })
        .await
    }

    pub async fn create_group(&self, name: String) -> Result<TechnicianGroup> {
        self.execute(move |conn| {
            let next_order: i64 = conn.query_row(
                "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM technician_groups",
                [],
                |row| row.get(0),
            )?;
            let id = Uuid::new_v4().to_string();

            conn.execute(
                "INSERT INTO technician_groups (id, name, sort_order, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, name, next_order, Utc::now().to_rfc3339()],
            )
            .context("failed to create technician group")?;

            Ok(TechnicianGroup {
                id,
                name,
                sort_order: next_order,
                members: Vec::new(),
            })
        })
        .await
    }

    /// Appends `subject` to the end of a group.
    pub async fn insert_group_member(
        &self,
        group_id: &str,
        subject: Subject,
        role_label: Option<String>,
    ) -> Result<GroupMember> {
        let group_id = group_id.to_string();
        self.execute(move |conn| {
            let group_exists: Option<String> = conn
                .query_row(
                    "SELECT id FROM technician_groups WHERE id = ?1",
                    params![group_id],
                    |row| row.get(0),
                )
                .optional()?;
            if group_exists.is_none() {
                bail!("technician group {group_id} not found");
            }

            let next_order: i64 = conn.query_row(
                "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM group_members WHERE group_id = ?1",
                params![group_id],
                |row| row.get(0),
            )?;
            let id = Uuid::new_v4().to_string();

            conn.execute(
                "INSERT INTO group_members
                     (id, group_id, subject_kind, subject_id, role_label, sort_order, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id,
                    group_id,
                    subject.kind().as_str(),
                    subject.id(),
                    role_label,
                    next_order,
                    Utc::now().to_rfc3339(),
                ],
            )
            .with_context(|| format!("failed to add {} to group {group_id}", subject.id()))?;

            Ok(GroupMember {
                id,
                group_id,
                subject,
                role_label,
                sort_order: next_order,
            })
        })
        .await
    }

    /// Removes a membership. Schedule entries of the member are left alone.
    pub async fn delete_group_member(&self, member_id: &str) -> Result<()> {
        let member_id = member_id.to_string();
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "DELETE FROM group_members WHERE id = ?1",
                params![member_id],
            )?;
            if rows_affected == 0 {
                return Err(anyhow!("group member {member_id} not found"));
            }
            Ok(())
        })
        .await
    }

    pub async fn set_member_role(&self, member_id: &str, role_label: Option<String>) -> Result<()> {
        let member_id = member_id.to_string();
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "UPDATE group_members SET role_label = ?1 WHERE id = ?2",
                params![role_label, member_id],
            )?;
            if rows_affected == 0 {
                return Err(anyhow!("group member {member_id} not found"));
            }
            Ok(())
        })
        .await
    }
}
