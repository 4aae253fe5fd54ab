pub mod holiday;
pub mod project;
pub mod roster;
pub mod schedule_entry;

pub use holiday::PublicHoliday;
pub use project::{Project, ProjectStatus};
pub use roster::{
    Contractor, ContractorCategory, ContractorDraft, ContractorRemoval, GroupMember,
    MemberDraft, TechnicianGroup, User,
};
pub use schedule_entry::{
    Assignment, EntryDraft, EntryType, LeaveType, NaturalKey, ScheduleData, ScheduleEntry,
    Subject, SubjectKind, TimeSlot, WriteMode,
};
