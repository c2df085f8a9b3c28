//! API client for the recruitment backend.
//!
//! Every outbound request goes through `ApiClient::execute`, which attaches
//! the session's bearer token, logs failures and owns the decision to end
//! the session when an authenticated request is rejected.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use super::envelope::{ApiResponse, Paginated};
use super::transport::{HttpRequest, HttpResponse, Part, ReqwestTransport, Transport};
use super::ApiError;
use crate::auth::SessionHandle;
use crate::models::{
    Activity, Application, ApplicationForm, ApplicationQuery, ApplicationStatus, ChatReply,
    DashboardStats, Faq, Interview, InterviewQuery, InterviewStatus, Job, JobForm, JobQuery,
    LoginForm, PasswordChange, ProfileUpdate, RatingInput, RegisterForm, ScheduleInterview, Upload,
    User,
};

/// `data` of a successful login or registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

/// API client for the recruitment backend.
/// Clone is cheap - the transport and session are shared.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: SessionHandle,
}

fn encode<B: Serialize>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session: SessionHandle) -> Self {
        Self { transport, session }
    }

    /// Client over `reqwest` for the given base URL.
    pub fn connect(base_url: &str, session: SessionHandle) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(base_url)?;
        Ok(Self::new(Arc::new(transport), session))
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    // ===== Request pipeline =====

    /// Send a request and apply the cross-cutting response policy.
    /// Non-2xx responses that may carry a business envelope are passed
    /// through for `decode`.
    async fn execute(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        // Only a rejected session token ends the session. Explicit tokens
        // (startup reconciliation, remote logout) are handled by their caller.
        let mut session_token = None;
        if request.bearer.is_none() {
            request.bearer = self.session.token();
            session_token = request.bearer.clone();
        }
        let method = request.method.clone();
        let path = request.path.clone();

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                error!(%method, path = %path, error = %e, "Request failed");
                return Err(e);
            }
        };

        if response.is_success() {
            return Ok(response);
        }

        match response.status {
            401 => {
                if let Some(ref token) = session_token {
                    self.session.expire_if_current(token);
                } else {
                    debug!(path = %path, "Unauthorized without a session token");
                }
                Err(ApiError::from_status(401, &response.body))
            }
            429 => {
                warn!(%method, path = %path, "Rate limit exceeded, please wait before retrying");
                Err(ApiError::RateLimited)
            }
            404 => {
                warn!(path = %path, "Resource not found");
                Ok(response)
            }
            status => {
                debug!(%method, path = %path, status, "Request rejected");
                Ok(response)
            }
        }
    }

    /// Turn a response into an envelope. 2xx bodies must decode; 4xx bodies
    /// that decode become business failures; anything else is an error.
    fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError>
    where
        T: Envelope,
    {
        if response.is_success() {
            if response.body.trim().is_empty() {
                return Err(ApiError::InvalidResponse("Empty response body".to_string()));
            }
            return serde_json::from_str(&response.body)
                .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)));
        }

        if (400..500).contains(&response.status) {
            if let Ok(mut envelope) = serde_json::from_str::<T>(&response.body) {
                envelope.mark_failed();
                return Ok(envelope);
            }
        }
        Err(ApiError::from_status(response.status, &response.body))
    }

    async fn send<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<ApiResponse<T>, ApiError> {
        let response = self.execute(request).await?;
        Self::decode(response)
    }

    async fn send_page<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<Paginated<T>, ApiError> {
        let response = self.execute(request).await?;
        Self::decode(response)
    }

    fn with_query<Q: Serialize>(request: HttpRequest, query: &Q) -> Result<HttpRequest, ApiError> {
        Ok(request.query_from(&encode(query)?))
    }

    // ===== Auth =====

    pub async fn login(&self, form: &LoginForm) -> Result<ApiResponse<AuthPayload>, ApiError> {
        self.send(HttpRequest::new(Method::POST, "/auth/login").json(encode(form)?)).await
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<ApiResponse<AuthPayload>, ApiError> {
        self.send(HttpRequest::new(Method::POST, "/auth/register").json(encode(form)?)).await
    }

    pub async fn current_user(&self) -> Result<ApiResponse<User>, ApiError> {
        self.send(HttpRequest::new(Method::GET, "/auth/me")).await
    }

    /// `GET /auth/me` with an explicit token, for validating a stored
    /// credential before the session holds it.
    pub async fn current_user_with_token(&self, token: &str) -> Result<ApiResponse<User>, ApiError> {
        let request = HttpRequest::new(Method::GET, "/auth/me").with_bearer(Some(token.to_string()));
        self.send(request).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<ApiResponse<User>, ApiError> {
        self.send(HttpRequest::new(Method::PUT, "/auth/profile").json(encode(update)?)).await
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<ApiResponse<Value>, ApiError> {
        self.send(HttpRequest::new(Method::PUT, "/auth/password").json(encode(change)?)).await
    }

    /// `POST /auth/logout` for a specific token. A 401 here never takes
    /// the forced-logout path.
    pub async fn logout(&self, token: &str) -> Result<ApiResponse<Value>, ApiError> {
        let request = HttpRequest::new(Method::POST, "/auth/logout").with_bearer(Some(token.to_string()));
        self.send(request).await
    }

    // ===== Jobs =====

    pub async fn jobs(&self, query: &JobQuery) -> Result<Paginated<Job>, ApiError> {
        self.send_page(Self::with_query(HttpRequest::new(Method::GET, "/jobs"), query)?).await
    }

    pub async fn job(&self, id: &str) -> Result<ApiResponse<Job>, ApiError> {
        self.send(HttpRequest::new(Method::GET, format!("/jobs/{}", id))).await
    }

    pub async fn create_job(&self, form: &JobForm) -> Result<ApiResponse<Job>, ApiError> {
        self.send(HttpRequest::new(Method::POST, "/jobs").json(encode(form)?)).await
    }

    pub async fn my_jobs(&self, query: &JobQuery) -> Result<Paginated<Job>, ApiError> {
        self.send_page(Self::with_query(HttpRequest::new(Method::GET, "/jobs/my-jobs"), query)?)
            .await
    }

    /// Partial edit; `changes` holds only the fields being changed.
    pub async fn update_job(&self, id: &str, changes: &Value) -> Result<ApiResponse<Job>, ApiError> {
        self.send(HttpRequest::new(Method::PUT, format!("/jobs/{}", id)).json(changes.clone()))
            .await
    }

    pub async fn delete_job(&self, id: &str) -> Result<ApiResponse<Value>, ApiError> {
        self.send(HttpRequest::new(Method::DELETE, format!("/jobs/{}", id))).await
    }

    // ===== Applications =====

    pub async fn applications(&self, query: &ApplicationQuery) -> Result<Paginated<Application>, ApiError> {
        self.send_page(Self::with_query(HttpRequest::new(Method::GET, "/applications"), query)?)
            .await
    }

    pub async fn application(&self, id: &str) -> Result<ApiResponse<Application>, ApiError> {
        self.send(HttpRequest::new(Method::GET, format!("/applications/{}", id))).await
    }

    /// Multipart submission. File type and size are the caller's concern.
    pub async fn submit_application(&self, form: &ApplicationForm) -> Result<ApiResponse<Application>, ApiError> {
        let mut parts = vec![Part::Text {
            name: "jobId".to_string(),
            value: form.job_id.clone(),
        }];
        if let Some(ref cover_letter) = form.cover_letter {
            parts.push(Part::Text {
                name: "coverLetter".to_string(),
                value: cover_letter.clone(),
            });
        }
        if let Some(ref resume) = form.resume {
            parts.push(Part::File {
                name: "resume".to_string(),
                upload: resume.clone(),
            });
        }
        if !form.custom_answers.is_empty() {
            parts.push(Part::Text {
                name: "customAnswers".to_string(),
                value: encode(&form.custom_answers)?.to_string(),
            });
        }

        self.send(HttpRequest::new(Method::POST, "/applications").multipart(parts)).await
    }

    pub async fn my_applications(&self, query: &ApplicationQuery) -> Result<Paginated<Application>, ApiError> {
        let request = HttpRequest::new(Method::GET, "/applications/my-applications");
        self.send_page(Self::with_query(request, query)?).await
    }

    pub async fn applications_for_job(
        &self,
        job_id: &str,
        query: &ApplicationQuery,
    ) -> Result<Paginated<Application>, ApiError> {
        let request = HttpRequest::new(Method::GET, format!("/applications/job/{}", job_id));
        self.send_page(Self::with_query(request, query)?).await
    }

    pub async fn update_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
        reason: Option<&str>,
    ) -> Result<ApiResponse<Application>, ApiError> {
        let body = json!({ "status": status, "reason": reason });
        self.send(HttpRequest::new(Method::PATCH, format!("/applications/{}/status", id)).json(body))
            .await
    }

    pub async fn add_application_note(
        &self,
        id: &str,
        content: &str,
        is_private: bool,
    ) -> Result<ApiResponse<Value>, ApiError> {
        let body = json!({ "content": content, "isPrivate": is_private });
        self.send(HttpRequest::new(Method::POST, format!("/applications/{}/notes", id)).json(body))
            .await
    }

    pub async fn rate_application(&self, id: &str, rating: &RatingInput) -> Result<ApiResponse<Value>, ApiError> {
        let request = HttpRequest::new(Method::POST, format!("/applications/{}/rating", id));
        self.send(request.json(encode(rating)?)).await
    }

    pub async fn withdraw_application(&self, id: &str, reason: Option<&str>) -> Result<ApiResponse<Value>, ApiError> {
        let request = HttpRequest::new(Method::DELETE, format!("/applications/{}", id));
        self.send(request.json(json!({ "reason": reason }))).await
    }

    // ===== Interviews =====

    pub async fn interviews(&self, query: &InterviewQuery) -> Result<Paginated<Interview>, ApiError> {
        self.send_page(Self::with_query(HttpRequest::new(Method::GET, "/interviews"), query)?)
            .await
    }

    pub async fn interview(&self, id: &str) -> Result<ApiResponse<Interview>, ApiError> {
        self.send(HttpRequest::new(Method::GET, format!("/interviews/{}", id))).await
    }

    pub async fn schedule_interview(&self, details: &ScheduleInterview) -> Result<ApiResponse<Interview>, ApiError> {
        self.send(HttpRequest::new(Method::POST, "/interviews").json(encode(details)?)).await
    }

    pub async fn reschedule_interview(
        &self,
        id: &str,
        new_date: DateTime<Utc>,
        reason: Option<&str>,
    ) -> Result<ApiResponse<Value>, ApiError> {
        let body = json!({ "newDate": new_date, "reason": reason });
        self.send(HttpRequest::new(Method::PUT, format!("/interviews/{}/reschedule", id)).json(body))
            .await
    }

    pub async fn update_interview_status(
        &self,
        id: &str,
        status: InterviewStatus,
        reason: Option<&str>,
    ) -> Result<ApiResponse<Value>, ApiError> {
        let body = json!({ "status": status, "reason": reason });
        self.send(HttpRequest::new(Method::PUT, format!("/interviews/{}/status", id)).json(body))
            .await
    }

    pub async fn add_interview_feedback(
        &self,
        id: &str,
        feedback: Value,
        notes: Option<&str>,
    ) -> Result<ApiResponse<Value>, ApiError> {
        let body = json!({ "feedback": feedback, "notes": notes });
        self.send(HttpRequest::new(Method::PUT, format!("/interviews/{}/feedback", id)).json(body))
            .await
    }

    // ===== Resumes =====

    pub async fn parse_resume(&self, resume: &Upload) -> Result<ApiResponse<Value>, ApiError> {
        let parts = vec![Part::File {
            name: "resume".to_string(),
            upload: resume.clone(),
        }];
        self.send(HttpRequest::new(Method::POST, "/resumes/parse").multipart(parts)).await
    }

    pub async fn update_parsed_resume(
        &self,
        application_id: &str,
        parsed: Value,
    ) -> Result<ApiResponse<Value>, ApiError> {
        let request = HttpRequest::new(Method::PUT, format!("/resumes/application/{}", application_id));
        self.send(request.json(json!({ "parsedData": parsed }))).await
    }

    pub async fn parsed_resume(&self, application_id: &str) -> Result<ApiResponse<Value>, ApiError> {
        self.send(HttpRequest::new(Method::GET, format!("/resumes/application/{}", application_id)))
            .await
    }

    // ===== Dashboard =====

    pub async fn dashboard_stats(&self) -> Result<ApiResponse<DashboardStats>, ApiError> {
        self.send(HttpRequest::new(Method::GET, "/dashboard/stats")).await
    }

    pub async fn recent_activity(&self, limit: Option<u32>) -> Result<ApiResponse<Vec<Activity>>, ApiError> {
        let request = HttpRequest::new(Method::GET, "/dashboard/recent-activity");
        self.send(request.query_from(&json!({ "limit": limit }))).await
    }

    // ===== Chatbot =====

    pub async fn send_chat_message(
        &self,
        message: &str,
        session_id: Option<&str>,
    ) -> Result<ApiResponse<ChatReply>, ApiError> {
        let body = json!({ "message": message, "sessionId": session_id });
        self.send(HttpRequest::new(Method::POST, "/chatbot/message").json(body)).await
    }

    pub async fn faqs(&self) -> Result<ApiResponse<Vec<Faq>>, ApiError> {
        self.send(HttpRequest::new(Method::GET, "/chatbot/faqs")).await
    }

    pub async fn health(&self) -> Result<ApiResponse<Value>, ApiError> {
        self.send(HttpRequest::new(Method::GET, "/health")).await
    }

    // ===== Generic verbs =====

    pub async fn get<T: DeserializeOwned>(&self, path: &str, params: Option<&Value>) -> Result<ApiResponse<T>, ApiError> {
        let mut request = HttpRequest::new(Method::GET, path);
        if let Some(params) = params {
            request = request.query_from(params);
        }
        self.send(request).await
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: Option<Value>) -> Result<ApiResponse<T>, ApiError> {
        self.send(Self::with_body(HttpRequest::new(Method::POST, path), body)).await
    }

    pub async fn put<T: DeserializeOwned>(&self, path: &str, body: Option<Value>) -> Result<ApiResponse<T>, ApiError> {
        self.send(Self::with_body(HttpRequest::new(Method::PUT, path), body)).await
    }

    pub async fn patch<T: DeserializeOwned>(&self, path: &str, body: Option<Value>) -> Result<ApiResponse<T>, ApiError> {
        self.send(Self::with_body(HttpRequest::new(Method::PATCH, path), body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ApiError> {
        self.send(HttpRequest::new(Method::DELETE, path)).await
    }

    fn with_body(request: HttpRequest, body: Option<Value>) -> HttpRequest {
        match body {
            Some(body) => request.json(body),
            None => request,
        }
    }
}

/// Response shapes `decode` can downgrade to a business failure.
trait Envelope {
    fn mark_failed(&mut self);
}

impl<T> Envelope for ApiResponse<T> {
    fn mark_failed(&mut self) {
        self.success = false;
        self.data = None;
    }
}

impl<T> Envelope for Paginated<T> {
    fn mark_failed(&mut self) {
        self.success = false;
        self.data.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_success_envelope() {
        let response = HttpResponse::new(200, r#"{"success":true,"data":{"token":"t","user":{"id":"1","email":"a@b.com","role":"admin"}}}"#);
        let decoded: ApiResponse<AuthPayload> = ApiClient::decode(response).expect("decode");
        assert!(decoded.success);
        assert_eq!(decoded.data.expect("data").token, "t");
    }

    #[test]
    fn test_decode_business_failure_on_4xx() {
        let response = HttpResponse::new(409, r#"{"success":false,"message":"Email already registered"}"#);
        let decoded: ApiResponse<AuthPayload> = ApiClient::decode(response).expect("decode");
        assert!(!decoded.success);
        assert_eq!(decoded.message.as_deref(), Some("Email already registered"));
    }

    #[test]
    fn test_decode_4xx_forces_failure_flag() {
        let response = HttpResponse::new(400, r#"{"success":true,"data":1}"#);
        let decoded: ApiResponse<u32> = ApiClient::decode(response).expect("decode");
        assert!(!decoded.success);
        assert_eq!(decoded.data, None);
    }

    #[test]
    fn test_decode_5xx_is_an_error() {
        let response = HttpResponse::new(502, r#"{"success":false,"message":"bad gateway"}"#);
        let decoded: Result<ApiResponse<Value>, _> = ApiClient::decode(response);
        assert_eq!(decoded, Err(ApiError::server_error("bad gateway")));
    }

    #[test]
    fn test_decode_malformed_success_body() {
        let decoded: Result<ApiResponse<Value>, _> = ApiClient::decode(HttpResponse::new(200, "<html>"));
        assert!(matches!(decoded, Err(ApiError::InvalidResponse(_))));

        let decoded: Result<ApiResponse<Value>, _> = ApiClient::decode(HttpResponse::new(200, ""));
        assert!(matches!(decoded, Err(ApiError::InvalidResponse(_))));
    }

    #[test]
    fn test_decode_4xx_html_is_an_error() {
        let decoded: Result<ApiResponse<Value>, _> = ApiClient::decode(HttpResponse::new(404, "Not Found"));
        assert!(matches!(decoded, Err(ApiError::NotFound { .. })));
    }
}
