pub mod engine;
pub mod error;
pub mod view;

pub use engine::{AttendanceSyncEngine, DayRow, DayView, EngineSnapshot, LoadOutcome};
pub use error::{EngineError, Notice};
pub use view::{AttendanceView, CellState, DaySummary, Transition, TransitionRejected, ViewEvent};
