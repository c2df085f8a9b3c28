//! Session operations: restore, login, register, logout, profile edits.
//!
//! `login` and `register` never fail from the caller's point of view; the
//! outcome is the returned (and published) `Session`. `update_profile` and
//! `change_password` record failures on the session *and* return them, so
//! an editing form can stay open while the global banner shows the error.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::handle::SessionHandle;
use super::session::{Session, SessionEvent, SessionPhase};
use crate::api::{ApiClient, ApiError, ApiResponse, AuthPayload};
use crate::models::{LoginForm, PasswordChange, ProfileUpdate, RegisterForm, User};

/// Upper bound on the best-effort remote logout call.
const LOGOUT_TIMEOUT_SECS: u64 = 5;

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";
const PROFILE_UPDATE_FAILED: &str = "Profile update failed";
const PASSWORD_CHANGE_FAILED: &str = "Password change failed";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// The server answered `success: false`.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Not signed in")]
    NotAuthenticated,
}

impl SessionError {
    /// Message suitable for the session's error banner.
    pub fn message(&self, fallback: &str) -> String {
        match self {
            SessionError::Rejected(message) => message.clone(),
            SessionError::Api(e) => e.server_message().unwrap_or(fallback).to_string(),
            SessionError::NotAuthenticated => self.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct SessionManager {
    api: ApiClient,
    session: SessionHandle,
}

impl SessionManager {
    pub fn new(api: ApiClient) -> Self {
        let session = api.session().clone();
        Self { api, session }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Startup reconciliation. A stored credential is only a hint to ask
    /// the server; the first authenticated state always carries the
    /// server's user record.
    pub async fn restore(&self) -> Session {
        if self.session.phase() != SessionPhase::Anonymous {
            debug!("Session already active, skipping restore");
            return self.session.snapshot();
        }

        let stored = match self.session.store().load() {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                debug!("No stored session");
                return self.session.snapshot();
            }
            Err(e) => {
                warn!(error = %e, "Failed to load stored session");
                self.session.clear_storage();
                return self.session.snapshot();
            }
        };

        self.session.dispatch(SessionEvent::Start);
        debug!(cached_user = %stored.user.id, "Validating stored session");

        let outcome = self.api.current_user_with_token(&stored.token).await;
        match outcome.map(ApiResponse::into_data) {
            Ok(Some(user)) => {
                if user.id != stored.user.id {
                    warn!("Stored user differs from server identity, using server record");
                }
                self.session.dispatch(SessionEvent::Success {
                    user,
                    token: stored.token,
                })
            }
            Ok(None) => {
                info!("Stored session rejected by server");
                self.session.dispatch(SessionEvent::Logout)
            }
            Err(e) => {
                info!(error = %e, "Stored session could not be validated");
                self.session.dispatch(SessionEvent::Logout)
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Session {
        let form = LoginForm {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        self.authenticate(self.api.login(&form), LOGIN_FAILED).await
    }

    pub async fn register(&self, form: &RegisterForm) -> Session {
        self.authenticate(self.api.register(form), REGISTRATION_FAILED).await
    }

    async fn authenticate<F>(&self, call: F, fallback: &str) -> Session
    where
        F: Future<Output = Result<ApiResponse<AuthPayload>, ApiError>>,
    {
        match self.session.phase() {
            SessionPhase::Authenticating => {
                warn!("Authentication already in progress");
                return self.session.snapshot();
            }
            SessionPhase::Authenticated => {
                info!("Signing out the current account before authenticating");
                self.logout().await;
            }
            SessionPhase::Anonymous | SessionPhase::Failed => {}
        }
        self.session.dispatch(SessionEvent::Start);

        let event = match call.await {
            Ok(response) if response.success => match response.data {
                Some(AuthPayload { user, token }) => SessionEvent::Success { user, token },
                None => SessionEvent::Failure(fallback.to_string()),
            },
            Ok(response) => SessionEvent::Failure(response.failure_message(fallback)),
            Err(e) => {
                warn!(error = %e, "Authentication request failed");
                SessionEvent::Failure(e.server_message().unwrap_or(fallback).to_string())
            }
        };
        self.session.dispatch(event)
    }

    /// Local logout always happens; the remote call is best effort.
    pub async fn logout(&self) -> Session {
        let current = self.session.snapshot();
        if current.phase() == SessionPhase::Anonymous {
            debug!("Already signed out");
            return current;
        }

        if let Some(token) = current.auth_token() {
            let remote = tokio::time::timeout(
                Duration::from_secs(LOGOUT_TIMEOUT_SECS),
                self.api.logout(token),
            );
            match remote.await {
                Ok(Ok(_)) => debug!("Remote logout acknowledged"),
                Ok(Err(e)) => warn!(error = %e, "Remote logout failed, continuing"),
                Err(_) => warn!("Remote logout timed out, continuing"),
            }
        }

        self.session.dispatch(SessionEvent::Logout)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, SessionError> {
        if !self.session.snapshot().is_authenticated() {
            return Err(SessionError::NotAuthenticated);
        }

        match self.api.update_profile(update).await {
            Ok(response) => {
                let message = response.failure_message(PROFILE_UPDATE_FAILED);
                match response.into_data() {
                    Some(user) => {
                        self.session.dispatch(SessionEvent::UpdateUser(user.clone()));
                        Ok(user)
                    }
                    None => Err(self.record(SessionError::Rejected(message), PROFILE_UPDATE_FAILED)),
                }
            }
            Err(e) => Err(self.record(e.into(), PROFILE_UPDATE_FAILED)),
        }
    }

    pub async fn change_password(&self, current: &str, new: &str) -> Result<(), SessionError> {
        if !self.session.snapshot().is_authenticated() {
            return Err(SessionError::NotAuthenticated);
        }

        let change = PasswordChange {
            current_password: current.to_string(),
            new_password: new.to_string(),
        };
        match self.api.change_password(&change).await {
            Ok(response) if response.success => {
                info!("Password changed");
                Ok(())
            }
            Ok(response) => {
                let message = response.failure_message(PASSWORD_CHANGE_FAILED);
                Err(self.record(SessionError::Rejected(message), PASSWORD_CHANGE_FAILED))
            }
            Err(e) => Err(self.record(e.into(), PASSWORD_CHANGE_FAILED)),
        }
    }

    pub fn clear_error(&self) -> Session {
        self.session.dispatch(SessionEvent::ClearError)
    }

    /// Put the failure on the session, hand it back for the caller.
    fn record(&self, error: SessionError, fallback: &str) -> SessionError {
        warn!(error = %error, "Session operation failed");
        self.session.dispatch(SessionEvent::Failure(error.message(fallback)));
        error
    }
}
