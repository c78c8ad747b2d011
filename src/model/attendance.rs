use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::employee::EmployeeId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
    ToSchema,
)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

/// One row of the attendance store. Unique per `(employee_id, date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 42, nullable = true)]
    #[serde(default)]
    pub id: Option<u64>,

    #[schema(example = 1, value_type = u64)]
    pub employee_id: EmployeeId,

    #[schema(example = "2024-01-10", format = "date", value_type = String)]
    pub date: NaiveDate,

    pub status: AttendanceStatus,

    #[schema(example = "John Doe", nullable = true)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,
}

/// Create payload for `POST /attendance/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttendance {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}
