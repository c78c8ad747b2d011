use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Local, NaiveDate};
use futures::future;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::error::EngineError;
use super::view::{AttendanceView, CellState, DaySummary, ViewEvent};
use crate::model::{AttendanceRecord, AttendanceStatus, Employee, EmployeeId, NewAttendance};
use crate::provider::{AttendanceStore, DirectoryProvider, StoreError};

/// What the engine can show for the selected date.
#[derive(Debug, Clone, PartialEq)]
pub enum DayView {
    NotLoaded,
    Ready(AttendanceView),
    /// The last load failed; cells are unknown rather than pending.
    Unavailable { date: NaiveDate, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub selected_date: NaiveDate,
    pub loading: bool,
    pub roster: Vec<Employee>,
    pub view: DayView,
}

impl EngineSnapshot {
    pub fn summary(&self) -> Option<DaySummary> {
        match &self.view {
            DayView::Ready(view) => Some(view.summary(&self.roster)),
            _ => None,
        }
    }

    /// Roster in order, each employee joined with their cell.
    pub fn rows(&self) -> Vec<DayRow> {
        let view = match &self.view {
            DayView::Ready(view) => Some(view),
            _ => None,
        };
        self.roster
            .iter()
            .map(|employee| {
                let cell = view.map(|v| v.cell(employee.id));
                DayRow {
                    employee: employee.clone(),
                    cell,
                    actionable: !self.loading && cell.is_some_and(CellState::is_pending),
                }
            })
            .collect()
    }

    pub fn error(&self) -> Option<&str> {
        match &self.view {
            DayView::Unavailable { reason, .. } => Some(reason.as_str()),
            _ => None,
        }
    }
}

/// One roster entry joined with its cell for the selected date.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRow {
    pub employee: Employee,
    /// `None` when the view is not loaded or failed to load.
    pub cell: Option<CellState>,
    /// Whether Present/Absent may be tapped for this row.
    pub actionable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied {
        date: NaiveDate,
        employees: usize,
        records: usize,
    },
    /// A newer load was issued before this one resolved; its result was dropped.
    Superseded { date: NaiveDate },
}

struct EngineState {
    selected_date: NaiveDate,
    roster: Vec<Employee>,
    view: DayView,
    loading: bool,
    // sequence number of the most recently issued load
    latest_load: u64,
    // bumped whenever `view` is replaced
    epoch: u64,
}

/// Snapshot taken before an optimistic write.
struct PendingMark {
    op_id: Uuid,
    employee_id: EmployeeId,
    date: NaiveDate,
    status: AttendanceStatus,
    prior: CellState,
    epoch: u64,
}

/// Settles a load whose future is dropped before the fetch resolves.
struct LoadGuard<'a> {
    engine: &'a AttendanceSyncEngine,
    seq: u64,
    date: NaiveDate,
    armed: bool,
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Ok(mut state) = self.engine.state.lock() else {
            return;
        };
        if state.latest_load != self.seq {
            return;
        }
        warn!(seq = self.seq, date = %self.date, "Attendance load cancelled");
        state.loading = false;
        state.selected_date = self.date;
        state.epoch += 1;
        state.view = DayView::Unavailable {
            date: self.date,
            reason: "load cancelled".to_string(),
        };
    }
}

/// Rolls an optimistic mark back unless it is settled.
struct MarkGuard<'a> {
    engine: &'a AttendanceSyncEngine,
    pending: PendingMark,
    settled: bool,
}

impl Drop for MarkGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!(
            op_id = %self.pending.op_id,
            employee_id = %self.pending.employee_id,
            "Attendance submission cancelled"
        );
        if let Ok(mut state) = self.engine.state.lock() {
            AttendanceSyncEngine::restore(&mut state, &self.pending);
        }
    }
}

/// Owns the attendance view of one selected date and keeps it in step with
/// the attendance store: optimistic marks, rollback on rejection, and
/// stale-load suppression.
pub struct AttendanceSyncEngine {
    directory: Arc<dyn DirectoryProvider>,
    store: Arc<dyn AttendanceStore>,
    state: Mutex<EngineState>,
}

impl AttendanceSyncEngine {
    pub fn new(directory: Arc<dyn DirectoryProvider>, store: Arc<dyn AttendanceStore>) -> Self {
        Self::starting_at(directory, store, Local::now().date_naive())
    }

    pub fn starting_at(
        directory: Arc<dyn DirectoryProvider>,
        store: Arc<dyn AttendanceStore>,
        selected_date: NaiveDate,
    ) -> Self {
        Self {
            directory,
            store,
            state: Mutex::new(EngineState {
                selected_date,
                roster: Vec::new(),
                view: DayView::NotLoaded,
                loading: false,
                latest_load: 0,
                epoch: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().expect("attendance state poisoned")
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.lock().selected_date
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let state = self.lock();
        EngineSnapshot {
            selected_date: state.selected_date,
            loading: state.loading,
            roster: state.roster.clone(),
            view: state.view.clone(),
        }
    }

    /// Cell of `employee_id`, or `None` if the view is not ready.
    pub fn cell(&self, employee_id: EmployeeId) -> Option<CellState> {
        match &self.lock().view {
            DayView::Ready(view) => Some(view.cell(employee_id)),
            _ => None,
        }
    }

    pub fn rows(&self) -> Vec<DayRow> {
        self.snapshot().rows()
    }

    /// Replaces roster and view with the server's state for `date`.
    ///
    /// Roster and records are fetched together. If a newer load is issued
    /// before this one resolves, the result is discarded and
    /// [`LoadOutcome::Superseded`] is returned.
    #[instrument(skip_all, fields(%date))]
    pub async fn load_day(&self, date: NaiveDate) -> Result<LoadOutcome, EngineError> {
        let seq = {
            let mut state = self.lock();
            state.latest_load += 1;
            state.loading = true;
            state.latest_load
        };
        debug!(seq, "Loading attendance");
        let mut guard = LoadGuard {
            engine: self,
            seq,
            date,
            armed: true,
        };

        let (roster, records) = future::join(
            self.directory.list_employees(),
            self.store.list_attendance_for_date(date),
        )
        .await;
        guard.armed = false;

        let mut state = self.lock();
        if state.latest_load != seq {
            debug!(seq, latest = state.latest_load, "Discarding superseded attendance load");
            return Ok(LoadOutcome::Superseded { date });
        }

        state.loading = false;
        state.selected_date = date;
        state.epoch += 1;

        let roster_error = match roster {
            Ok(roster) => {
                state.roster = roster;
                None
            }
            Err(e) => Some(e),
        };

        match (roster_error, records) {
            (None, Ok(records)) => {
                let count = records.len();
                state.view = DayView::Ready(AttendanceView::from_records(date, records));
                info!(employees = state.roster.len(), records = count, "Attendance loaded");
                Ok(LoadOutcome::Applied {
                    date,
                    employees: state.roster.len(),
                    records: count,
                })
            }
            (Some(e), _) | (None, Err(e)) => {
                error!(error = %e, employees = state.roster.len(), "Failed to load attendance");
                state.view = DayView::Unavailable {
                    date,
                    reason: e.to_string(),
                };
                Err(e.into())
            }
        }
    }

    /// Marks `employee_id` for the selected date.
    ///
    /// The cell shows `status` as soon as this is called. If the store
    /// refuses or cannot be reached, the cell is restored to its prior state
    /// and the error is returned.
    pub async fn mark_attendance(
        &self,
        employee_id: EmployeeId,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, EngineError> {
        let mut guard = MarkGuard {
            engine: self,
            pending: self.begin_mark(employee_id, status)?,
            settled: false,
        };
        let pending = &guard.pending;

        debug!(
            op_id = %pending.op_id,
            %employee_id,
            date = %pending.date,
            %status,
            "Submitting attendance"
        );

        let result = self
            .store
            .create_attendance(NewAttendance {
                employee_id,
                date: pending.date,
                status,
            })
            .await;

        let outcome = match result {
            Ok(record) => {
                info!(
                    op_id = %pending.op_id,
                    %employee_id,
                    date = %pending.date,
                    %status,
                    "Attendance marked"
                );
                Ok(record)
            }
            Err(err) => {
                self.roll_back(pending, &err);
                Err(err.into())
            }
        };
        guard.settled = true;
        outcome
    }

    fn begin_mark(
        &self,
        employee_id: EmployeeId,
        status: AttendanceStatus,
    ) -> Result<PendingMark, EngineError> {
        let mut state = self.lock();
        if state.loading {
            return Err(EngineError::Loading);
        }

        let selected_date = state.selected_date;
        let epoch = state.epoch;
        let in_roster = state.roster.iter().any(|e| e.id == employee_id);

        let view = match &mut state.view {
            DayView::Ready(view) => view,
            DayView::Unavailable { date, reason } => {
                return Err(EngineError::ViewUnavailable {
                    date: *date,
                    reason: reason.clone(),
                });
            }
            DayView::NotLoaded => {
                return Err(EngineError::ViewUnavailable {
                    date: selected_date,
                    reason: "not loaded".to_string(),
                });
            }
        };

        if !in_roster {
            error!(%employee_id, "Attempted to mark an employee outside the roster");
            return Err(EngineError::UnknownEmployee(employee_id));
        }

        let transition = view.apply(ViewEvent::Mark {
            employee_id,
            status,
        })?;

        Ok(PendingMark {
            op_id: Uuid::new_v4(),
            employee_id,
            date: view.date(),
            status,
            prior: transition.before,
            epoch,
        })
    }

    fn roll_back(&self, pending: &PendingMark, err: &StoreError) {
        let (op_id, employee_id, date) = (pending.op_id, pending.employee_id, pending.date);
        match err {
            StoreError::Conflict { .. } => {
                warn!(%op_id, %employee_id, %date, "Attendance was already marked elsewhere");
            }
            StoreError::Transport(reason) => {
                warn!(%op_id, %employee_id, %date, %reason, "Attendance store unreachable");
            }
            StoreError::Validation(reason) => {
                error!(%op_id, %employee_id, %date, %reason, "Attendance store rejected the request");
            }
        }

        Self::restore(&mut self.lock(), pending);
    }

    fn restore(state: &mut EngineState, pending: &PendingMark) {
        let (op_id, employee_id) = (pending.op_id, pending.employee_id);
        if state.epoch != pending.epoch {
            debug!(%op_id, "View replaced since the mark was issued; nothing to roll back");
            return;
        }

        if let DayView::Ready(view) = &mut state.view {
            let rollback = view.apply(ViewEvent::Rollback {
                employee_id: pending.employee_id,
                tentative: pending.status,
                prior: pending.prior,
            });
            match rollback {
                Ok(transition) => {
                    debug!(%op_id, %employee_id, restored = ?transition.after, "Optimistic mark rolled back")
                }
                Err(rejected) => warn!(%op_id, %rejected, "Skipped rollback"),
            }
        }
    }
}
