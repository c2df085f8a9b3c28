//! REST API client module for the recruitment backend.
//!
//! This module provides the `ApiClient` for talking to the backend's auth,
//! job, application, interview, resume, dashboard and chatbot endpoints.
//!
//! Every call returns the `{ success, message?, data? }` envelope for
//! business outcomes and an `ApiError` for transport or authorization
//! failures. Requests carry the session's JWT bearer token.

pub mod client;
pub mod envelope;
pub mod error;
pub mod retry;
pub mod transport;

pub use client::{ApiClient, AuthPayload};
pub use envelope::{ApiResponse, PageInfo, Paginated};
pub use error::ApiError;
pub use retry::{with_retry, RetryPolicy};
pub use transport::{HttpRequest, HttpResponse, Part, RequestBody, ReqwestTransport, Transport};
