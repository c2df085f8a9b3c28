//! Job postings and the job list/create payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Draft,
    Active,
    Paused,
    Closed,
    Filled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Freelance,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Company {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobLocation {
    /// remote, onsite or hybrid
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl JobLocation {
    pub fn formatted(&self) -> String {
        let parts: Vec<&str> = [
            self.city.as_deref(),
            self.state.as_deref(),
            self.country.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect();
        match (parts.is_empty(), self.kind.as_deref()) {
            (true, Some(kind)) => kind.to_string(),
            (true, None) => "Unspecified".to_string(),
            (false, _) => parts.join(", "),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Salary {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub period: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub company: Company,
    #[serde(default)]
    pub location: JobLocation,
    #[serde(default)]
    pub salary: Option<Salary>,
    #[serde(default)]
    pub job_type: Option<JobType>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub applications_count: u32,
    #[serde(default)]
    pub views_count: u32,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub application_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub has_applied: Option<bool>,
}

/// Filters for `GET /jobs`. Unset fields are omitted from the query string.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<JobType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_max: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Range {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: u32,
    pub max: u32,
    pub currency: String,
    pub period: String,
}

/// Payload for creating or editing a posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobForm {
    pub title: String,
    pub company: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub category: String,
    pub experience: Range,
    pub salary: SalaryRange,
    #[serde(default)]
    pub benefits: Vec<String>,
    pub application_deadline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_parses_with_sparse_fields() {
        let json = r#"{"_id":"j1","title":"Rust Engineer","jobType":"full-time","status":"active","company":{"name":"Acme"},"location":{"type":"remote"}}"#;
        let job: Job = serde_json::from_str(json).expect("parse job");
        assert_eq!(job.id, "j1");
        assert_eq!(job.job_type, Some(JobType::FullTime));
        assert_eq!(job.status, Some(JobStatus::Active));
        assert_eq!(job.location.formatted(), "remote");
        assert!(job.skills.is_empty());
    }

    #[test]
    fn test_location_formatted() {
        let loc = JobLocation {
            kind: Some("onsite".to_string()),
            city: Some("Berlin".to_string()),
            state: None,
            country: Some("Germany".to_string()),
        };
        assert_eq!(loc.formatted(), "Berlin, Germany");
        assert_eq!(JobLocation::default().formatted(), "Unspecified");
    }

    #[test]
    fn test_job_query_omits_unset_filters() {
        let query = JobQuery {
            search: Some("rust".to_string()),
            job_type: Some(JobType::PartTime),
            ..Default::default()
        };
        let value = serde_json::to_value(&query).expect("serialize");
        assert_eq!(value, serde_json::json!({"search": "rust", "jobType": "part-time"}));
    }
}
