pub mod connection;
pub mod helpers;
mod migrations;
pub mod models;
pub mod repositories;

pub use connection::Database;
pub use models::{
    Assignment, Contractor, ContractorCategory, ContractorDraft, ContractorRemoval, EntryDraft,
    EntryType, GroupMember, LeaveType, MemberDraft, Project, ProjectStatus, PublicHoliday,
    ScheduleData, ScheduleEntry, Subject, SubjectKind, TechnicianGroup, TimeSlot, User,
    WriteMode,
};
