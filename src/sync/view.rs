//! Date-scoped attendance projection and its transition rules.
//!
//! Everything here is pure: no I/O, no locking. The engine snapshots a
//! cell, applies a tentative [`ViewEvent::Mark`], and on a failed write
//! applies [`ViewEvent::Rollback`] with the snapshot.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::model::{AttendanceRecord, AttendanceStatus, Employee, EmployeeId};

/// State of one (employee, date) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    /// No record exists yet. Not the same thing as `Marked(Absent)`.
    Pending,
    Marked(AttendanceStatus),
}

impl CellState {
    pub fn is_pending(self) -> bool {
        matches!(self, CellState::Pending)
    }

    pub fn status(self) -> Option<AttendanceStatus> {
        match self {
            CellState::Pending => None,
            CellState::Marked(status) => Some(status),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    Mark {
        employee_id: EmployeeId,
        status: AttendanceStatus,
    },
    Rollback {
        employee_id: EmployeeId,
        tentative: AttendanceStatus,
        prior: CellState,
    },
}

/// Result of an accepted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub employee_id: EmployeeId,
    pub before: CellState,
    pub after: CellState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionRejected {
    #[error("employee {employee_id} is already marked {status}")]
    AlreadyMarked {
        employee_id: EmployeeId,
        status: AttendanceStatus,
    },

    /// The cell no longer holds the tentative value being rolled back.
    #[error("employee {employee_id} no longer holds the tentative {tentative} mark")]
    StaleRollback {
        employee_id: EmployeeId,
        tentative: AttendanceStatus,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceView {
    date: NaiveDate,
    cells: HashMap<EmployeeId, AttendanceStatus>,
}

impl AttendanceView {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            cells: HashMap::new(),
        }
    }

    /// Builds the view from exactly the records the store returned for
    /// `date`. Records for any other day are dropped.
    pub fn from_records(date: NaiveDate, records: impl IntoIterator<Item = AttendanceRecord>) -> Self {
        let mut view = Self::empty(date);
        for record in records {
            if record.date != date {
                warn!(
                    employee_id = %record.employee_id,
                    record_date = %record.date,
                    %date,
                    "Ignoring attendance record for another date"
                );
                continue;
            }
            if let Some(previous) = view.cells.insert(record.employee_id, record.status) {
                warn!(
                    employee_id = %record.employee_id,
                    %date,
                    %previous,
                    "Store returned more than one record for the same day"
                );
            }
        }
        view
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn cell(&self, employee_id: EmployeeId) -> CellState {
        self.cells
            .get(&employee_id)
            .map_or(CellState::Pending, |s| CellState::Marked(*s))
    }

    pub fn apply(&mut self, event: ViewEvent) -> Result<Transition, TransitionRejected> {
        match event {
            ViewEvent::Mark {
                employee_id,
                status,
            } => {
                let before = self.cell(employee_id);
                if let CellState::Marked(current) = before {
                    return Err(TransitionRejected::AlreadyMarked {
                        employee_id,
                        status: current,
                    });
                }
                self.cells.insert(employee_id, status);
                Ok(Transition {
                    employee_id,
                    before,
                    after: CellState::Marked(status),
                })
            }
            ViewEvent::Rollback {
                employee_id,
                tentative,
                prior,
            } => {
                let before = self.cell(employee_id);
                if before != CellState::Marked(tentative) {
                    return Err(TransitionRejected::StaleRollback {
                        employee_id,
                        tentative,
                    });
                }
                match prior {
                    CellState::Pending => self.cells.remove(&employee_id),
                    CellState::Marked(status) => self.cells.insert(employee_id, status),
                };
                Ok(Transition {
                    employee_id,
                    before,
                    after: prior,
                })
            }
        }
    }

    /// Header counts over `roster`; employees without a cell are pending.
    pub fn summary(&self, roster: &[Employee]) -> DaySummary {
        roster
            .iter()
            .fold(DaySummary::default(), |mut acc, e| {
                match self.cell(e.id) {
                    CellState::Pending => acc.pending += 1,
                    CellState::Marked(AttendanceStatus::Present) => acc.present += 1,
                    CellState::Marked(AttendanceStatus::Absent) => acc.absent += 1,
                }
                acc
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DaySummary {
    pub present: usize,
    pub absent: usize,
    pub pending: usize,
}
