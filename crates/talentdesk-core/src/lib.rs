//! Core library for talentdesk.
//!
//! Client-side pieces of the recruitment platform: the REST `ApiClient`,
//! the session state machine with durable credential storage, the access
//! policy used for route guards and navigation, and the dashboard
//! statistics loader.

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod models;

pub use api::{ApiClient, ApiError, ApiResponse, Paginated};
pub use auth::{Session, SessionHandle, SessionManager, SessionPhase};
pub use config::Config;
pub use dashboard::{StatsLoader, StatsView};
