//! REST client for the HRMS API.
//!
//! Implements both collaborator traits against the server's
//! `/employees/` and `/attendance/` endpoints using [`reqwest`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{AttendanceStore, DirectoryProvider, StoreError};
use crate::model::{AttendanceRecord, Employee, NewAttendance};

/// HTTP client for one HRMS API deployment.
#[derive(Clone)]
pub struct HrmsApiClient {
    client: reqwest::Client,
    base_url: String,
}

/// Error bodies come either as `{"detail": ..}` or `{"message": ..}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
    message: Option<String>,
}

impl ErrorBody {
    fn text(self) -> Option<String> {
        self.detail.or(self.message)
    }
}

impl HrmsApiClient {
    /// * `base_url` - e.g. `http://localhost:8000`, without trailing slash.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(StoreError::transport)?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Reads the failure body and maps the status onto the store taxonomy.
    async fn classify_failure(
        response: reqwest::Response,
        attendance: Option<&NewAttendance>,
    ) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::text)
            .unwrap_or(body);

        debug!(status = status.as_u16(), detail = %detail, "HRMS API returned an error");

        match (status, attendance) {
            (StatusCode::CONFLICT, Some(a)) => StoreError::Conflict {
                employee_id: a.employee_id,
                date: a.date,
            },
            (StatusCode::BAD_REQUEST, Some(a))
                if detail.to_lowercase().contains("already marked") =>
            {
                StoreError::Conflict {
                    employee_id: a.employee_id,
                    date: a.date,
                }
            }
            // create only; refused reads are Transport
            (
                StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY,
                Some(_),
            ) => StoreError::Validation(detail),
            _ => StoreError::Transport(format!("HRMS API error ({}): {}", status.as_u16(), detail)),
        }
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        attendance: Option<&NewAttendance>,
    ) -> Result<T, StoreError> {
        if !response.status().is_success() {
            return Err(Self::classify_failure(response, attendance).await);
        }
        response.json::<T>().await.map_err(|e| {
            warn!(error = %e, "Failed to decode HRMS API response");
            StoreError::transport(e)
        })
    }
}

#[async_trait]
impl DirectoryProvider for HrmsApiClient {
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let response = self
            .client
            .get(self.url("/employees/"))
            .send()
            .await
            .map_err(StoreError::transport)?;

        Self::decode(response, None).await
    }
}

#[async_trait]
impl AttendanceStore for HrmsApiClient {
    async fn list_attendance_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let response = self
            .client
            .get(self.url("/attendance/"))
            .query(&[("date", date.format("%Y-%m-%d").to_string())])
            .send()
            .await
            .map_err(StoreError::transport)?;

        Self::decode(response, None).await
    }

    async fn create_attendance(
        &self,
        attendance: NewAttendance,
    ) -> Result<AttendanceRecord, StoreError> {
        let response = self
            .client
            .post(self.url("/attendance/"))
            .json(&attendance)
            .send()
            .await
            .map_err(StoreError::transport)?;

        Self::decode(response, Some(&attendance)).await
    }
}
