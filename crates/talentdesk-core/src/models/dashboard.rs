//! Dashboard statistics, activity feed and chatbot types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Headline counts. Which fields are present depends on the caller's role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_jobs: Option<u64>,
    pub active_jobs: Option<u64>,
    pub total_applications: Option<u64>,
    pub total_interviews: Option<u64>,
    pub total_users: Option<u64>,
    pub total_recruiters: Option<u64>,
    pub total_applicants: Option<u64>,
    pub upcoming_interviews: Option<u64>,
    pub pending_applications: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    #[serde(default)]
    pub applications_by_status: BTreeMap<String, u64>,
    #[serde(default)]
    pub interviews_by_status: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopJob {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub application_count: u64,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub overview: Overview,
    #[serde(default)]
    pub breakdown: Breakdown,
    #[serde(default)]
    pub top_jobs: Vec<TopJob>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faq {
    pub category: String,
    #[serde(default)]
    pub questions: Vec<FaqEntry>,
}

/// Reply from `POST /chatbot/message`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}
