//! The owned session container shared by the API client and the manager.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::session::{Session, SessionEvent, SessionPhase};
use super::store::{CredentialStore, PersistedCredentials};

/// Capacity of the notice channel. Notices are rare; slow receivers only
/// ever miss stale ones.
const NOTICE_CHANNEL_CAPACITY: usize = 16;

/// Out-of-band signals for hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthNotice {
    /// An authenticated request came back unauthorized. The session has
    /// been reset; the host should return to its login entry point.
    SessionExpired,
}

struct Inner {
    state: watch::Sender<Session>,
    store: Arc<dyn CredentialStore>,
    notices: broadcast::Sender<AuthNotice>,
}

/// One per client process. Clone is cheap and every clone sees the same
/// session. Mutation goes through `dispatch` only.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Inner>,
}

impl SessionHandle {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        let (state, _) = watch::channel(Session::default());
        let (notices, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                state,
                store,
                notices,
            }),
        }
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.store
    }

    /// Current session value.
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Bearer token of the current session, read fresh on every call.
    pub fn token(&self) -> Option<String> {
        self.inner.state.borrow().auth_token().map(str::to_string)
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.state.borrow().phase()
    }

    /// Receiver that observes every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    pub fn notices(&self) -> broadcast::Receiver<AuthNotice> {
        self.inner.notices.subscribe()
    }

    /// Run one transition and apply its persistence side effect.
    /// Returns the resulting session.
    pub fn dispatch(&self, event: SessionEvent) -> Session {
        let mut before = SessionPhase::Anonymous;
        let mut after = Session::default();
        self.inner.state.send_if_modified(|current| {
            before = current.phase();
            let next = current.clone().reduce(&event);
            let changed = next != *current;
            *current = next;
            after = current.clone();
            changed
        });

        self.persist(&event, before, &after);
        after
    }

    /// The global invalid-token path: drop stored credentials, reset the
    /// session and tell the host to go back to login.
    pub fn expire(&self) {
        warn!("Authorization failed on an authenticated request, ending session");
        self.dispatch(SessionEvent::Logout);
        // Nobody listening is fine.
        let _ = self.inner.notices.send(AuthNotice::SessionExpired);
    }

    /// `expire()`, but only while `token` is still the session's token.
    /// A late rejection of a replaced token leaves the newer session alone.
    /// Returns whether the session was ended.
    pub fn expire_if_current(&self, token: &str) -> bool {
        if self.token().as_deref() != Some(token) {
            debug!("Ignoring unauthorized response for a replaced token");
            return false;
        }
        self.expire();
        true
    }

    pub fn clear_storage(&self) {
        if let Err(e) = self.inner.store.clear() {
            warn!(error = %e, "Failed to clear stored credentials");
        }
    }

    fn persist(&self, event: &SessionEvent, before: SessionPhase, after: &Session) {
        match event {
            SessionEvent::Success { .. } | SessionEvent::UpdateUser(_) if after.is_authenticated() => {
                if let (Some(user), Some(token)) = (after.current_user(), after.auth_token()) {
                    let credentials = PersistedCredentials {
                        token: token.to_string(),
                        user: user.clone(),
                    };
                    match self.inner.store.save(&credentials) {
                        Ok(()) => debug!("Stored credentials"),
                        Err(e) => warn!(error = %e, "Failed to store credentials"),
                    }
                }
                if before != SessionPhase::Authenticated {
                    let user_id = after.current_user().map(|u| u.id.as_str()).unwrap_or_default();
                    info!(user_id, "Signed in");
                }
            }
            SessionEvent::Logout => {
                self.clear_storage();
                if before == SessionPhase::Authenticated {
                    info!("Signed out");
                }
            }
            _ => {}
        }
    }
}
