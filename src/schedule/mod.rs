pub mod backend;
pub mod editor;
pub mod error;
pub mod propagate;
pub mod reconcile;
pub mod render;
pub mod roster;
pub mod session;
pub mod store;

pub use backend::ScheduleBackend;
pub use editor::{SlotContent, SlotEditor, SlotState};
pub use error::ValidationError;
pub use propagate::{apply_propagation, plan_propagation, PropagationPlan, PropagationReport};
pub use reconcile::{apply_save, build_draft, plan_save, SavePlan, SaveReport, SoftFailure};
pub use render::{render_text_grid, summarize_cell, truncate_label, CellLabel, CellView};
pub use roster::validate_contractor;
pub use session::ScheduleSession;
pub use store::{load_snapshot, ScheduleSnapshot};
