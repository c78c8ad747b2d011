//! Attendance marking for the HRMS web client.
//!
//! [`sync::AttendanceSyncEngine`] turns a Present/Absent tap into one
//! date-scoped attendance record: the cell updates optimistically, the
//! store is asked to create the record, and the cell is rolled back if the
//! store refuses. The [`api`] module exposes the engine over HTTP as the
//! attendance console.

pub mod api;
pub mod config;
pub mod docs;
pub mod model;
pub mod provider;
pub mod routes;
pub mod sync;
