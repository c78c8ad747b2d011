#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use hrm_attendance::model::{AttendanceRecord, AttendanceStatus, Employee, EmployeeId, NewAttendance};
use hrm_attendance::provider::{AttendanceStore, DirectoryProvider, InMemoryHrms, StoreError};
use hrm_attendance::sync::AttendanceSyncEngine;
use tokio::sync::{Notify, Semaphore};

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

pub fn roster() -> Vec<Employee> {
    vec![Employee::new(1, "A", "engineering"), Employee::new(2, "B", "sales")]
}

/// Holds a call until the test releases it.
pub struct Gate {
    entered: Notify,
    open: Semaphore,
}

impl Default for Gate {
    fn default() -> Self {
        Self {
            entered: Notify::new(),
            open: Semaphore::new(0),
        }
    }
}

impl Gate {
    /// Resolves once a call has reached the gate.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.open.add_permits(1);
    }

    async fn pass(&self) {
        self.entered.notify_one();
        let _permit = self.open.acquire().await.expect("gate closed");
    }
}

/// In-memory HRMS whose calls can be held in flight or made to fail.
pub struct ScriptedHrms {
    pub inner: InMemoryHrms,
    day_gates: Mutex<HashMap<NaiveDate, Arc<Gate>>>,
    create_gate: Mutex<Option<Arc<Gate>>>,
    roster_failure: Mutex<Option<StoreError>>,
    day_failure: Mutex<Option<StoreError>>,
    create_failure: Mutex<Option<StoreError>>,
    pub create_calls: AtomicUsize,
}

impl ScriptedHrms {
    pub fn new(employees: Vec<Employee>) -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryHrms::with_employees(employees),
            day_gates: Mutex::new(HashMap::new()),
            create_gate: Mutex::new(None),
            roster_failure: Mutex::new(None),
            day_failure: Mutex::new(None),
            create_failure: Mutex::new(None),
            create_calls: AtomicUsize::new(0),
        })
    }

    /// Writes a record directly, as another session would.
    pub async fn seed(&self, employee_id: u64, date: NaiveDate, status: AttendanceStatus) {
        self.inner
            .create_attendance(NewAttendance {
                employee_id: EmployeeId(employee_id),
                date,
                status,
            })
            .await
            .unwrap();
    }

    pub fn hold_day(&self, date: NaiveDate) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.day_gates.lock().unwrap().insert(date, gate.clone());
        gate
    }

    pub fn hold_create(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.create_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn fail_roster(&self, err: StoreError) {
        *self.roster_failure.lock().unwrap() = Some(err);
    }

    pub fn fail_next_day(&self, err: StoreError) {
        *self.day_failure.lock().unwrap() = Some(err);
    }

    pub fn fail_next_create(&self, err: StoreError) {
        *self.create_failure.lock().unwrap() = Some(err);
    }

    pub fn creates(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DirectoryProvider for ScriptedHrms {
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        if let Some(err) = self.roster_failure.lock().unwrap().take() {
            return Err(err);
        }
        self.inner.list_employees().await
    }
}

#[async_trait]
impl AttendanceStore for ScriptedHrms {
    async fn list_attendance_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let gate = self.day_gates.lock().unwrap().get(&date).cloned();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        if let Some(err) = self.day_failure.lock().unwrap().take() {
            return Err(err);
        }
        self.inner.list_attendance_for_date(date).await
    }

    async fn create_attendance(
        &self,
        attendance: NewAttendance,
    ) -> Result<AttendanceRecord, StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.create_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        if let Some(err) = self.create_failure.lock().unwrap().take() {
            return Err(err);
        }
        self.inner.create_attendance(attendance).await
    }
}

pub fn engine_for(hrms: &Arc<ScriptedHrms>) -> Arc<AttendanceSyncEngine> {
    Arc::new(AttendanceSyncEngine::starting_at(
        hrms.clone(),
        hrms.clone(),
        day(10),
    ))
}
