//! Interview scheduling records and payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::job::SortOrder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Scheduled,
    Confirmed,
    Rescheduled,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterviewType {
    Phone,
    Video,
    InPerson,
    Technical,
    Hr,
    Final,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub application: Value,
    #[serde(default)]
    pub job: Value,
    #[serde(default)]
    pub applicant: Value,
    #[serde(default)]
    pub interviewer: Value,
    #[serde(rename = "type")]
    pub kind: InterviewType,
    #[serde(default = "first_round")]
    pub round: u32,
    pub scheduled_date: DateTime<Utc>,
    /// Minutes
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub meeting_link: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub status: InterviewStatus,
    #[serde(default)]
    pub agenda: Option<String>,
    #[serde(default)]
    pub feedback: Option<Value>,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
}

fn first_round() -> u32 {
    1
}

impl Interview {
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_date > now
            && matches!(
                self.status,
                InterviewStatus::Scheduled | InterviewStatus::Confirmed | InterviewStatus::Rescheduled
            )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInterview {
    pub application_id: String,
    pub interviewer_id: String,
    #[serde(rename = "type")]
    pub kind: InterviewType,
    pub scheduled_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agenda: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InterviewStatus>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "type")]
    pub kind: Option<InterviewType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upcoming: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}
