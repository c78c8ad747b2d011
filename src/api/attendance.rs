use actix_web::{HttpResponse, HttpResponseBuilder, Responder, http::StatusCode, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::model::{AttendanceStatus, Employee, EmployeeId};
use crate::provider::StoreError;
use crate::sync::{
    AttendanceSyncEngine, CellState, DayRow, DaySummary, EngineError, EngineSnapshot,
    LoadOutcome, TransitionRejected,
};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RowState {
    Pending,
    Marked,
    /// Attendance for the day could not be loaded.
    Unknown,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceRow {
    pub employee: Employee,
    pub state: RowState,
    #[schema(example = "Present", nullable = true)]
    pub status: Option<AttendanceStatus>,
    /// Present/Absent buttons enabled
    pub actionable: bool,
}

impl From<DayRow> for AttendanceRow {
    fn from(row: DayRow) -> Self {
        let state = match row.cell {
            None => RowState::Unknown,
            Some(CellState::Pending) => RowState::Pending,
            Some(CellState::Marked(_)) => RowState::Marked,
        };
        Self {
            employee: row.employee,
            state,
            status: row.cell.and_then(CellState::status),
            actionable: row.actionable,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[schema(example = json!({
    "selected_date": "2024-01-10",
    "loading": false,
    "superseded": false,
    "summary": { "present": 1, "absent": 0, "pending": 1 },
    "error": null,
    "rows": [
        {
            "employee": { "id": 1, "full_name": "A", "department": "ops", "present_days": 3 },
            "state": "marked",
            "status": "Present",
            "actionable": false
        },
        {
            "employee": { "id": 2, "full_name": "B", "department": "ops", "present_days": 0 },
            "state": "pending",
            "status": null,
            "actionable": true
        }
    ]
}))]
pub struct AttendanceDayResponse {
    #[schema(example = "2024-01-10", format = "date", value_type = String)]
    pub selected_date: NaiveDate,
    pub loading: bool,
    /// A newer date selection replaced this request's result.
    pub superseded: bool,
    pub summary: Option<DaySummary>,
    /// Set when attendance for the day could not be loaded.
    pub error: Option<String>,
    pub rows: Vec<AttendanceRow>,
}

impl AttendanceDayResponse {
    fn from_snapshot(snapshot: EngineSnapshot, superseded: bool) -> Self {
        Self {
            selected_date: snapshot.selected_date,
            loading: snapshot.loading,
            superseded,
            summary: snapshot.summary(),
            error: snapshot.error().map(str::to_string),
            rows: snapshot.rows().into_iter().map(AttendanceRow::from).collect(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct SelectDate {
    #[schema(example = "2024-01-10", format = "date", value_type = String)]
    pub date: NaiveDate,
}

#[derive(Deserialize, ToSchema)]
pub struct MarkAttendance {
    #[schema(example = 2, value_type = u64)]
    pub employee_id: EmployeeId,
    #[schema(example = "Absent")]
    pub status: AttendanceStatus,
}

fn status_for(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Loading | EngineError::ViewUnavailable { .. } => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        EngineError::UnknownEmployee(_) | EngineError::Store(StoreError::Validation(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        EngineError::Transition(TransitionRejected::AlreadyMarked { .. })
        | EngineError::Store(StoreError::Conflict { .. }) => StatusCode::CONFLICT,
        EngineError::Store(StoreError::Transport(_)) => StatusCode::BAD_GATEWAY,
        EngineError::Transition(TransitionRejected::StaleRollback { .. }) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(err: &EngineError) -> HttpResponse {
    HttpResponseBuilder::new(status_for(err)).json(json!({
        "message": err.notice().message(),
        "detail": err.to_string(),
    }))
}

/// Attendance for the selected date
#[utoipa::path(
    get,
    path = "/api/attendance",
    responses(
        (status = 200, description = "Attendance of the selected date", body = AttendanceDayResponse)
    ),
    tag = "Attendance"
)]
pub async fn get_attendance(engine: web::Data<AttendanceSyncEngine>) -> impl Responder {
    HttpResponse::Ok().json(AttendanceDayResponse::from_snapshot(engine.snapshot(), false))
}

/// Select a date and reload its attendance
#[utoipa::path(
    put,
    path = "/api/attendance/date",
    request_body = SelectDate,
    responses(
        (status = 200, description = "Attendance loaded, or superseded by a newer selection", body = AttendanceDayResponse),
        (status = 502, description = "The HRMS API could not be read; rows are reported as unknown", body = AttendanceDayResponse)
    ),
    tag = "Attendance"
)]
pub async fn select_date(
    engine: web::Data<AttendanceSyncEngine>,
    payload: web::Json<SelectDate>,
) -> impl Responder {
    let (status, superseded) = match engine.load_day(payload.date).await {
        Ok(LoadOutcome::Applied { .. }) => (StatusCode::OK, false),
        Ok(LoadOutcome::Superseded { .. }) => (StatusCode::OK, true),
        Err(e) => (status_for(&e), false),
    };

    HttpResponseBuilder::new(status).json(AttendanceDayResponse::from_snapshot(
        engine.snapshot(),
        superseded,
    ))
}

/// Mark an employee present or absent for the selected date
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = MarkAttendance,
    responses(
        (status = 201, description = "Attendance recorded", body = crate::model::AttendanceRecord),
        (status = 409, description = "Already marked", body = Object, example = json!({
            "message": "Attendance already marked for this date"
        })),
        (status = 422, description = "Unknown employee or rejected status", body = Object),
        (status = 502, description = "HRMS API unreachable", body = Object, example = json!({
            "message": "Could not reach the server, please try again"
        })),
        (status = 503, description = "Attendance still loading or unavailable", body = Object),
        (status = 429, description = "Too many requests")
    ),
    tag = "Attendance"
)]
pub async fn mark_attendance(
    engine: web::Data<AttendanceSyncEngine>,
    payload: web::Json<MarkAttendance>,
) -> impl Responder {
    match engine
        .mark_attendance(payload.employee_id, payload.status)
        .await
    {
        Ok(record) => HttpResponse::Created().json(record),
        Err(e) => error_response(&e),
    }
}
