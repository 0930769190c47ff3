//! Filter criteria, summary views, and the response envelope.

use crate::{ActivityAction, ActivityRecord};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Structured filter. Every predicate is optional and they combine with AND.
/// Empty or whitespace-only strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub action: Option<ActivityAction>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub entity_type: Option<String>,
    /// Inclusive lower bound on the record timestamp.
    #[serde(default)]
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the record timestamp.
    #[serde(default)]
    pub date_to: Option<DateTime<Utc>>,
    /// Case-insensitive substring over the free-text fields.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub vin_number: Option<String>,
    #[serde(default)]
    pub part_number: Option<String>,
    #[serde(default)]
    pub car_model: Option<String>,
    #[serde(default)]
    pub car_brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Per-section activity, ordered by most recent activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionActivity {
    pub section: String,
    pub count: usize,
    pub last_activity: DateTime<Utc>,
}

/// Whole-log statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    pub total_activities: usize,
    pub today_activities: usize,
    pub unique_users_today: usize,
    pub sections_activity: Vec<SectionActivity>,
}

/// One histogram bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub key: String,
    pub count: usize,
}

/// Number of records on one local calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Activity breakdown for one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
    pub user_id: String,
    /// Name and role as of the employee's most recent record.
    pub user_name: String,
    pub user_role: String,
    pub total_activities: usize,
    pub today_activities: usize,
    pub last_activity: DateTime<Utc>,
    pub most_active_section: String,
    pub action_breakdown: Vec<CountEntry>,
    pub section_breakdown: Vec<CountEntry>,
    pub recent_activities: Vec<ActivityRecord>,
}

/// Response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseResponse<T> {
    #[serde(default = "default_code")]
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
}

fn default_code() -> i32 {
    200
}

impl<T> BaseResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 200,
            message: "Success".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}
