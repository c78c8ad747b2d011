use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{AttendanceStore, DirectoryProvider, StoreError};
use crate::model::{AttendanceRecord, AttendanceStatus, Employee, EmployeeId, NewAttendance};

#[derive(Default)]
struct Tables {
    employees: Vec<Employee>,
    // unique on (employee_id, date)
    attendance: BTreeMap<(EmployeeId, NaiveDate), AttendanceRecord>,
    next_id: u64,
}

/// In-process directory and attendance store with the same uniqueness
/// rule as the HRMS database.
#[derive(Default)]
pub struct InMemoryHrms {
    tables: RwLock<Tables>,
}

impl InMemoryHrms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_employees(employees: impl IntoIterator<Item = Employee>) -> Self {
        let store = Self::new();
        for employee in employees {
            store.add_employee(employee);
        }
        store
    }

    pub fn add_employee(&self, employee: Employee) {
        self.tables
            .write()
            .expect("hrms tables poisoned")
            .employees
            .push(employee);
    }

    /// Number of stored records for `(employee_id, date)`: 0 or 1.
    pub fn records_for(&self, employee_id: EmployeeId, date: NaiveDate) -> usize {
        let tables = self.tables.read().expect("hrms tables poisoned");
        usize::from(tables.attendance.contains_key(&(employee_id, date)))
    }

    pub fn record(&self, employee_id: EmployeeId, date: NaiveDate) -> Option<AttendanceRecord> {
        let tables = self.tables.read().expect("hrms tables poisoned");
        tables.attendance.get(&(employee_id, date)).cloned()
    }

    fn present_days(tables: &Tables, employee_id: EmployeeId) -> u32 {
        let count = tables
            .attendance
            .values()
            .filter(|r| r.employee_id == employee_id && r.status == AttendanceStatus::Present)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

#[async_trait]
impl DirectoryProvider for InMemoryHrms {
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let tables = self.tables.read().expect("hrms tables poisoned");
        Ok(tables
            .employees
            .iter()
            .map(|e| Employee {
                present_days: Self::present_days(&tables, e.id),
                ..e.clone()
            })
            .collect())
    }
}

#[async_trait]
impl AttendanceStore for InMemoryHrms {
    async fn list_attendance_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let tables = self.tables.read().expect("hrms tables poisoned");
        Ok(tables
            .attendance
            .values()
            .filter(|r| r.date == date)
            .cloned()
            .collect())
    }

    async fn create_attendance(
        &self,
        attendance: NewAttendance,
    ) -> Result<AttendanceRecord, StoreError> {
        let mut tables = self.tables.write().expect("hrms tables poisoned");

        let employee_name = tables
            .employees
            .iter()
            .find(|e| e.id == attendance.employee_id)
            .map(|e| e.full_name.clone())
            .ok_or_else(|| {
                StoreError::Validation(format!("Employee {} not found", attendance.employee_id))
            })?;

        let key = (attendance.employee_id, attendance.date);
        if tables.attendance.contains_key(&key) {
            return Err(StoreError::Conflict {
                employee_id: attendance.employee_id,
                date: attendance.date,
            });
        }

        tables.next_id += 1;
        let record = AttendanceRecord {
            id: Some(tables.next_id),
            employee_id: attendance.employee_id,
            date: attendance.date,
            status: attendance.status,
            employee_name: Some(employee_name),
        };
        tables.attendance.insert(key, record.clone());
        Ok(record)
    }
}
