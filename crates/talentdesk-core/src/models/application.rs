//! Job applications, uploads and application review payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::job::SortOrder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    UnderReview,
    Shortlisted,
    InterviewScheduled,
    Interviewed,
    SecondInterview,
    FinalInterview,
    OfferExtended,
    OfferAccepted,
    OfferDeclined,
    Hired,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    /// Whether the application has reached a final outcome.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::OfferAccepted
                | ApplicationStatus::OfferDeclined
                | ApplicationStatus::Hired
                | ApplicationStatus::Rejected
                | ApplicationStatus::Withdrawn
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeFile {
    pub filename: String,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mimetype: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomAnswer {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub required: bool,
}

/// An application as returned by the backend. Applicant and job are
/// sometimes populated objects and sometimes bare ids, so they stay loose.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub applicant: Value,
    #[serde(default)]
    pub job: Value,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub resume: Option<ResumeFile>,
    #[serde(default)]
    pub parsed_resume_data: Option<Value>,
    #[serde(default)]
    pub custom_answers: Vec<CustomAnswer>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub withdrawal_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Application {
    /// Title of the job if the backend populated it.
    pub fn job_title(&self) -> Option<&str> {
        self.job.get("title").and_then(Value::as_str)
    }
}

/// An in-memory file sent as one part of a multipart request.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApplicationForm {
    pub job_id: String,
    pub cover_letter: Option<String>,
    pub resume: Option<Upload>,
    pub custom_answers: Vec<CustomAnswer>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

/// Recruiter scoring of an application, 1-5 per axis.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RatingInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cultural: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_with_populated_job() {
        let json = r#"{"_id":"a1","status":"under_review","job":{"_id":"j1","title":"Backend Dev"},"applicant":"u1"}"#;
        let app: Application = serde_json::from_str(json).expect("parse application");
        assert_eq!(app.status, ApplicationStatus::UnderReview);
        assert_eq!(app.job_title(), Some("Backend Dev"));
        assert!(!app.status.is_closed());
    }

    #[test]
    fn test_closed_statuses() {
        assert!(ApplicationStatus::Hired.is_closed());
        assert!(ApplicationStatus::Withdrawn.is_closed());
        assert!(!ApplicationStatus::Shortlisted.is_closed());
    }
}
