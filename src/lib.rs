pub mod calendar;
pub mod db;
pub mod schedule;
pub mod settings;
pub mod utils;

use std::{env, path::PathBuf};

use anyhow::{Context, Result};

use calendar::{parse_date_key, today, ViewMode};
use db::Database;
use schedule::{render_text_grid, ScheduleSession};
use settings::SettingsStore;

const ENABLE_LOGS: bool = true;

fn data_dir() -> PathBuf {
    env::var_os("CREWBOARD_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("crewboard-data"))
}

fn debug_mode() -> bool {
    env::var("CREWBOARD_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Opens the schedule store and prints the grid around a date.
///
/// Arguments: an optional `YYYY-MM-DD` cursor (defaults to today) and `--month` for the
/// month view.
pub fn run() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(if debug_mode() {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let mut cursor = today();
    let mut month = false;
    for arg in env::args().skip(1) {
        if arg == "--month" {
            month = true;
        } else {
            cursor = parse_date_key(&arg)?;
        }
    }

    let data_dir = data_dir();
    let database = Database::new(data_dir.join("crewboard.sqlite3"))?;
    let settings_store = SettingsStore::new(data_dir.join("settings.json"))?;

    let mut grid = settings_store.grid();
    if month {
        grid.view_mode = ViewMode::Month;
    }

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(async {
        let mut session = ScheduleSession::new(cursor, grid);
        if let Err(err) = session.reload(&database).await {
            log_error!("Could not load the schedule: {err:#}");
            return Err(err);
        }

        let days = session.visible_days();
        print!(
            "{}",
            render_text_grid(session.snapshot(), &days, &session.grid_settings())
        );
        Ok(())
    })
}
