use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Row};
use uuid::Uuid;

use crate::db::{
    connection::Database,
    helpers::{non_blank, parse_datetime},
    models::User,
};

fn row_to_user(row: &Row) -> Result<User> {
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        notes: row.get("notes")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

impl Database {
    pub async fn create_user(&self, name: String, email: Option<String>) -> Result<User> {
        self.execute(move |conn| {
            let now = Utc::now();
            let user = User {
                id: Uuid::new_v4().to_string(),
                name: name.trim().to_string(),
                email: non_blank(email),
                notes: None,
                created_at: now,
                updated_at: now,
            };

            conn.execute(
                "INSERT INTO users (id, name, email, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![user.id, user.name, user.email, now.to_rfc3339()],
            )
            .context("failed to create user")?;

            Ok(user)
        })
        .await
    }

    pub async fn get_users(&self) -> Result<Vec<User>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, email, notes, created_at, updated_at
                 FROM users
                 ORDER BY name COLLATE NOCASE ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut users = Vec::new();
            while let Some(row) = rows.next()? {
                users.push(row_to_user(row)?);
            }

            Ok(users)
        })
        .await
    }

    /// Replaces a technician's notes; blank text clears them.
    pub async fn set_user_note(&self, user_id: &str, note: Option<String>) -> Result<()> {
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "UPDATE users SET notes = ?1, updated_at = ?2 WHERE id = ?3",
                params![non_blank(note), Utc::now().to_rfc3339(), user_id],
            )?;

            if rows_affected == 0 {
                return Err(anyhow!("user {user_id} not found"));
            }
            Ok(())
        })
        .await
    }
}
