use chrono::NaiveDate;

use super::view::TransitionRejected;
use crate::model::EmployeeId;
use crate::provider::StoreError;

/// What the user should be told about a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The day is already marked for this employee.
    AlreadyMarked,
    /// The server could not be reached; nothing was saved.
    Unreachable,
    /// The request was refused as malformed.
    Rejected,
    /// Attendance for the day is not available yet.
    NotReady,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Notice::AlreadyMarked => "Attendance already marked for this date",
            Notice::Unreachable => "Could not reach the server, please try again",
            Notice::Rejected => "The request was rejected",
            Notice::NotReady => "Attendance for this date is not available",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("attendance is still loading")]
    Loading,

    #[error("attendance for {date} is unavailable: {reason}")]
    ViewUnavailable { date: NaiveDate, reason: String },

    #[error("employee {0} is not in the roster")]
    UnknownEmployee(EmployeeId),

    /// Rejected locally; no request was sent.
    #[error(transparent)]
    Transition(#[from] TransitionRejected),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn notice(&self) -> Notice {
        match self {
            EngineError::Loading | EngineError::ViewUnavailable { .. } => Notice::NotReady,
            EngineError::UnknownEmployee(_) => Notice::Rejected,
            EngineError::Transition(TransitionRejected::AlreadyMarked { .. }) => {
                Notice::AlreadyMarked
            }
            EngineError::Transition(TransitionRejected::StaleRollback { .. }) => Notice::NotReady,
            EngineError::Store(StoreError::Conflict { .. }) => Notice::AlreadyMarked,
            EngineError::Store(StoreError::Transport(_)) => Notice::Unreachable,
            EngineError::Store(StoreError::Validation(_)) => Notice::Rejected,
        }
    }
}
