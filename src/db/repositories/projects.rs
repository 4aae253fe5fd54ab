use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Row};
use uuid::Uuid;

use crate::db::{
    connection::Database,
    helpers::{non_blank, parse_datetime, parse_project_status},
    models::{Project, ProjectStatus},
};

fn row_to_project(row: &Row) -> Result<Project> {
    let status: String = row.get("status")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Project {
        id: row.get("id")?,
        name: row.get("name")?,
        code: row.get("code")?,
        status: parse_project_status(&status)?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

impl Database {
    /// Projects that can still receive schedule entries, i.e. everything not completed.
    pub async fn get_eligible_projects(&self) -> Result<Vec<Project>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, code, status, created_at, updated_at
                 FROM projects
                 WHERE status != 'completed'
                 ORDER BY name COLLATE NOCASE ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut projects = Vec::new();
            while let Some(row) = rows.next()? {
                projects.push(row_to_project(row)?);
            }

            Ok(projects)
        })
        .await
    }

    pub async fn create_project(&self, name: String, code: Option<String>) -> Result<Project> {
        self.execute(move |conn| {
            let now = Utc::now();
            let project = Project {
                id: Uuid::new_v4().to_string(),
                name: name.trim().to_string(),
                code: non_blank(code),
                status: ProjectStatus::Active,
                created_at: now,
                updated_at: now,
            };

            conn.execute(
                "INSERT INTO projects (id, name, code, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![
                    project.id,
                    project.name,
                    project.code,
                    project.status.as_str(),
                    now.to_rfc3339(),
                ],
            )
            .context("failed to create project")?;

            Ok(project)
        })
        .await
    }

    pub async fn set_project_status(&self, project_id: &str, status: ProjectStatus) -> Result<()> {
        let project_id = project_id.to_string();
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "UPDATE projects SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.as_str(), Utc::now().to_rfc3339(), project_id],
            )?;

            if rows_affected == 0 {
                return Err(anyhow!("project {project_id} not found"));
            }
            Ok(())
        })
        .await
    }
}
