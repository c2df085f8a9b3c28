//! The uniform response shapes returned by every backend endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{ success, message?, data?, errors? }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default = "none", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Value>,
}

// `#[serde(default)]` on a generic Option would require `T: Default`.
fn none<T>() -> Option<T> {
    None
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            errors: Vec::new(),
        }
    }

    /// The payload, only when the call succeeded.
    pub fn into_data(self) -> Option<T> {
        if self.success {
            self.data
        } else {
            None
        }
    }

    /// Server-supplied message, or `fallback` when the server gave none.
    pub fn failure_message(&self, fallback: &str) -> String {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_jobs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_applications: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_interviews: Option<u64>,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_prev: bool,
}

impl PageInfo {
    /// Whichever total the endpoint reported.
    pub fn total(&self) -> Option<u64> {
        self.total_jobs
            .or(self.total_applications)
            .or(self.total_interviews)
    }
}

/// Paginated variant of the envelope used by list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: PageInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_data_requires_success() {
        let ok: ApiResponse<u32> = serde_json::from_str(r#"{"success":true,"data":7}"#).expect("parse");
        assert_eq!(ok.into_data(), Some(7));

        let odd: ApiResponse<u32> = serde_json::from_str(r#"{"success":false,"data":7}"#).expect("parse");
        assert_eq!(odd.into_data(), None);
    }

    #[test]
    fn test_failure_message_fallback() {
        let resp: ApiResponse<()> = serde_json::from_str(r#"{"success":false}"#).expect("parse");
        assert_eq!(resp.failure_message("Login failed"), "Login failed");

        let resp: ApiResponse<()> =
            serde_json::from_str(r#"{"success":false,"message":"  "}"#).expect("parse");
        assert_eq!(resp.failure_message("Login failed"), "Login failed");

        let resp = ApiResponse::<()>::failure("Email already registered");
        assert_eq!(resp.failure_message("Registration failed"), "Email already registered");
    }

    #[test]
    fn test_paginated_parse() {
        let json = r#"{"success":true,"data":[1,2],"pagination":{"currentPage":1,"totalPages":3,"totalJobs":25,"hasNext":true,"hasPrev":false}}"#;
        let page: Paginated<u32> = serde_json::from_str(json).expect("parse");
        assert_eq!(page.data, vec![1, 2]);
        assert_eq!(page.pagination.total(), Some(25));
        assert!(page.pagination.has_next);
    }
}
