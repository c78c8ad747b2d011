use chrono::NaiveDateTime;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stable identifier of an employee in the HRMS directory.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
pub struct EmployeeId(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "full_name": "John Doe",
        "email": "john.doe@company.com",
        "department": "engineering",
        "present_days": 12,
        "created_at": "2024-01-01T09:00:00"
    })
)]
pub struct Employee {
    #[schema(example = 1, value_type = u64)]
    pub id: EmployeeId,

    #[schema(example = "John Doe")]
    pub full_name: String,

    #[schema(example = "john.doe@company.com", nullable = true)]
    #[serde(default)]
    pub email: Option<String>,

    #[schema(example = "engineering")]
    pub department: String,

    /// Maintained by the store; the client only reads it.
    #[schema(example = 12)]
    #[serde(default)]
    pub present_days: u32,

    #[schema(example = "2024-01-01T09:00:00", value_type = String, format = "date-time", nullable = true)]
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl Employee {
    pub fn new(id: u64, full_name: impl Into<String>, department: impl Into<String>) -> Self {
        Self {
            id: EmployeeId(id),
            full_name: full_name.into(),
            email: None,
            department: department.into(),
            present_days: 0,
            created_at: None,
        }
    }
}
