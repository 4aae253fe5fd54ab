use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A public holiday; every cell on this date is read-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicHoliday {
    pub date: NaiveDate,
    pub name: String,
}
