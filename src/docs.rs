use crate::api::attendance::{
    AttendanceDayResponse, AttendanceRow, MarkAttendance, RowState, SelectDate,
};
use crate::model::{AttendanceRecord, AttendanceStatus, Employee};
use crate::sync::DaySummary;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance Console API",
        version = "0.1.0",
        description = r#"
## Daily attendance console

Marks employees **Present** or **Absent** for a selected day against the
HRMS attendance store.

### Behaviour
- Selecting a date reloads the roster and that day's records; a newer
  selection wins over a slower older one.
- A mark is shown immediately and rolled back if the store refuses it.
- A day can be marked once per employee. Re-marking is refused locally
  (`409`) without contacting the store.
- When the day cannot be loaded, rows are reported as `unknown` rather
  than `pending`.

### Errors
All errors carry `{ "message": ..., "detail": ... }`; `message` is meant
for display.
"#,
    ),
    paths(
        crate::api::attendance::get_attendance,
        crate::api::attendance::select_date,
        crate::api::attendance::mark_attendance,
    ),
    components(
        schemas(
            AttendanceDayResponse,
            AttendanceRow,
            RowState,
            SelectDate,
            MarkAttendance,
            AttendanceRecord,
            AttendanceStatus,
            Employee,
            DaySummary
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance marking APIs"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_console_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();

        assert!(paths.contains(&"/api/attendance".to_string()));
        assert!(paths.contains(&"/api/attendance/date".to_string()));
    }
}
