//! The client-side session and its transition function.
//!
//! A `Session` can only be produced by `Session::default()` (anonymous) or
//! by `Session::reduce`, so the invariants below hold for every value that
//! exists:
//!
//! - `is_authenticated()` implies a user and a token are present.
//! - `is_loading()` is true only in the `Authenticating` phase.

use tracing::debug;

use crate::models::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated,
    /// Last auth attempt failed. Treated as anonymous for access control.
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Start,
    Success { user: User, token: String },
    Failure(String),
    Logout,
    UpdateUser(User),
    ClearError,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Start => "start",
            SessionEvent::Success { .. } => "success",
            SessionEvent::Failure(_) => "failure",
            SessionEvent::Logout => "logout",
            SessionEvent::UpdateUser(_) => "update_user",
            SessionEvent::ClearError => "clear_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    phase: SessionPhase,
    current_user: Option<User>,
    auth_token: Option<String>,
    last_error: Option<String>,
}

impl Session {
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == SessionPhase::Authenticating
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated
            && self.current_user.is_some()
            && self.auth_token.is_some()
    }

    /// Apply one event. Events that make no sense in the current phase
    /// return the session unchanged.
    pub fn reduce(self, event: &SessionEvent) -> Session {
        use SessionPhase::*;

        let from = self.phase;
        let next = match (from, event) {
            (Anonymous | Failed, SessionEvent::Start) => Session {
                phase: Authenticating,
                last_error: None,
                ..self
            },
            (Authenticating, SessionEvent::Success { user, token }) => Session {
                phase: Authenticated,
                current_user: Some(user.clone()),
                auth_token: Some(token.clone()),
                last_error: None,
            },
            (Authenticating | Authenticated, SessionEvent::Failure(message)) => Session {
                phase: Failed,
                current_user: None,
                auth_token: None,
                last_error: Some(message.clone()),
            },
            (_, SessionEvent::Logout) => Session::default(),
            (Authenticated, SessionEvent::UpdateUser(user)) => Session {
                current_user: Some(user.clone()),
                ..self
            },
            (_, SessionEvent::ClearError) => Session {
                last_error: None,
                ..self
            },
            (_, other) => {
                debug!(phase = ?from, event = other.name(), "Ignoring session event");
                self
            }
        };

        debug!(from = ?from, to = ?next.phase, event = event.name(), "Session transition");
        next
    }
}
