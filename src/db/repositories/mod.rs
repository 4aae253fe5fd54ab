pub mod contractors;
pub mod groups;
pub mod projects;
pub mod schedule_entries;
pub mod users;
