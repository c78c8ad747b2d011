//! Contracts of the two collaborators the attendance engine talks to, and
//! the implementations shipped with the crate.
//!
//! The HRMS server is the authority for both: the employee directory and
//! the attendance store (one row per employee per day).

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::{AttendanceRecord, Employee, EmployeeId, NewAttendance};

pub mod http;
pub mod memory;

pub use http::HrmsApiClient;
pub use memory::InMemoryHrms;

/// Errors returned by a [`DirectoryProvider`] or an [`AttendanceStore`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Server unreachable, timed out, or answered with a status that
    /// carries no domain meaning.
    #[error("transport error: {0}")]
    Transport(String),

    /// The `(employee_id, date)` key already has a record.
    #[error("attendance already marked for employee {employee_id} on {date}")]
    Conflict {
        employee_id: EmployeeId,
        date: NaiveDate,
    },

    /// Malformed request: unknown employee or unrecognized status.
    #[error("validation error: {0}")]
    Validation(String),
}

impl StoreError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        StoreError::Transport(err.to_string())
    }
}

#[async_trait]
pub trait DirectoryProvider: Send + Sync {
    /// Full roster, in the order the directory returns it.
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Every record stored for `date`.
    async fn list_attendance_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;

    /// Creates the record for `(employee_id, date)`; fails with
    /// [`StoreError::Conflict`] when one already exists.
    async fn create_attendance(
        &self,
        attendance: NewAttendance,
    ) -> Result<AttendanceRecord, StoreError>;
}
