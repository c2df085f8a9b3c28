mod common;

use reqwest::Method;
use serde_json::json;

use common::{data, failure, harness, sign_in};
use talentdesk_core::api::{ApiError, Part, RequestBody};
use talentdesk_core::auth::SessionPhase;
use talentdesk_core::models::{ApplicationForm, CustomAnswer, JobQuery, JobType, Upload};

#[tokio::test]
async fn test_bearer_is_read_fresh_for_every_request() {
    let h = harness();
    h.transport.respond(Method::GET, "/health", 200, data(json!({})));
    h.api.health().await.expect("anonymous health");
    assert_eq!(h.transport.last_request().expect("request").bearer, None);

    sign_in(&h, "first", "applicant").await;
    h.transport.respond(Method::GET, "/health", 200, data(json!({})));
    h.api.health().await.expect("health");
    assert_eq!(
        h.transport.last_request().expect("request").bearer.as_deref(),
        Some("first")
    );

    h.transport.respond(Method::POST, "/auth/logout", 200, data(json!({})));
    h.manager.logout().await;
    sign_in(&h, "second", "applicant").await;
    h.transport.respond(Method::GET, "/health", 200, data(json!({})));
    h.api.health().await.expect("health");
    assert_eq!(
        h.transport.last_request().expect("request").bearer.as_deref(),
        Some("second")
    );
}

#[tokio::test]
async fn test_rate_limit_is_marked_and_keeps_session() {
    let h = harness();
    sign_in(&h, "t1", "recruiter").await;
    h.transport
        .respond(Method::GET, "/dashboard/stats", 429, failure("Too many requests"));

    let err = h.api.dashboard_stats().await.expect_err("rate limited");

    assert!(err.is_rate_limited());
    assert!(err.is_transient());
    assert_eq!(h.session.phase(), SessionPhase::Authenticated);
}

#[tokio::test]
async fn test_server_error_is_rejected() {
    let h = harness();
    h.transport
        .respond(Method::GET, "/jobs/abc", 500, failure("Database unavailable"));

    let err = h.api.job("abc").await.expect_err("server error");

    assert_eq!(err, ApiError::server_error("Database unavailable"));
}

#[tokio::test]
async fn test_not_found_with_envelope_is_business_failure() {
    let h = harness();
    h.transport.respond(Method::GET, "/jobs/missing", 404, failure("Job not found"));

    let response = h.api.job("missing").await.expect("envelope");

    assert!(!response.success);
    assert_eq!(response.message.as_deref(), Some("Job not found"));
    assert!(response.into_data().is_none());
}

#[tokio::test]
async fn test_not_found_without_envelope_is_error() {
    let h = harness();
    h.transport
        .respond(Method::GET, "/jobs/missing", 404, json!("Cannot GET /jobs/missing"));

    let err = h.api.job("missing").await.expect_err("not found");

    assert!(matches!(err, ApiError::NotFound { .. }));
}

#[tokio::test]
async fn test_transport_errors_pass_through() {
    let h = harness();
    h.transport.fail(Method::GET, "/health", ApiError::Timeout);

    let err = h.api.health().await.expect_err("timeout");

    assert_eq!(err, ApiError::Timeout);
}

#[tokio::test]
async fn test_job_list_query_and_pagination() {
    let h = harness();
    h.transport.respond(
        Method::GET,
        "/jobs",
        200,
        json!({
            "success": true,
            "data": [
                { "_id": "j1", "title": "Rust Engineer", "jobType": "full-time" },
                { "_id": "j2", "title": "SRE" }
            ],
            "pagination": { "currentPage": 1, "totalPages": 2, "totalJobs": 11, "hasNext": true }
        }),
    );

    let query = JobQuery {
        page: Some(1),
        search: Some("rust".to_string()),
        job_type: Some(JobType::FullTime),
        ..Default::default()
    };
    let page = h.api.jobs(&query).await.expect("jobs");

    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].job_type, Some(JobType::FullTime));
    assert_eq!(page.pagination.total(), Some(11));

    let mut sent = h.transport.last_request().expect("request").query;
    sent.sort();
    assert_eq!(
        sent,
        vec![
            ("jobType".to_string(), "full-time".to_string()),
            ("page".to_string(), "1".to_string()),
            ("search".to_string(), "rust".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_submit_application_sends_multipart_parts() {
    let h = harness();
    sign_in(&h, "t1", "applicant").await;
    h.transport.respond(
        Method::POST,
        "/applications",
        201,
        json!({ "success": true, "message": "Application submitted successfully" }),
    );

    let form = ApplicationForm {
        job_id: "j1".to_string(),
        cover_letter: Some("Hello".to_string()),
        resume: Some(Upload::new("cv.pdf", "application/pdf", b"%PDF".to_vec())),
        custom_answers: vec![CustomAnswer {
            question: "Start date?".to_string(),
            answer: "June".to_string(),
            required: true,
        }],
    };
    let response = h.api.submit_application(&form).await.expect("submitted");
    assert!(response.success);

    let request = h.transport.last_request().expect("request");
    assert_eq!(request.bearer.as_deref(), Some("t1"));
    let parts = match request.body {
        RequestBody::Multipart(parts) => parts,
        other => panic!("expected multipart body, got {:?}", other),
    };
    let names: Vec<&str> = parts
        .iter()
        .map(|part| match part {
            Part::Text { name, .. } | Part::File { name, .. } => name.as_str(),
        })
        .collect();
    assert_eq!(names, vec!["jobId", "coverLetter", "resume", "customAnswers"]);

    match &parts[2] {
        Part::File { upload, .. } => {
            assert_eq!(upload.file_name, "cv.pdf");
            assert_eq!(upload.mime_type, "application/pdf");
        }
        other => panic!("expected file part, got {:?}", other),
    }
    match &parts[3] {
        Part::Text { value, .. } => {
            let answers: serde_json::Value = serde_json::from_str(value).expect("answers json");
            assert_eq!(answers[0]["answer"], "June");
        }
        other => panic!("expected text part, got {:?}", other),
    }
}

#[tokio::test]
async fn test_withdraw_sends_reason_in_delete_body() {
    let h = harness();
    h.transport.respond(Method::DELETE, "/applications/a1", 200, data(json!({})));

    h.api
        .withdraw_application("a1", Some("Accepted another offer"))
        .await
        .expect("withdrawn");

    let request = h.transport.last_request().expect("request");
    assert_eq!(request.method, Method::DELETE);
    match request.body {
        RequestBody::Json(body) => assert_eq!(body["reason"], "Accepted another offer"),
        other => panic!("expected JSON body, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unparseable_success_body_is_invalid_response() {
    let h = harness();
    h.transport.respond(Method::GET, "/health", 200, json!(null));

    let err = h.api.health().await.expect_err("invalid");

    assert!(matches!(err, ApiError::InvalidResponse(_)));
}
