//! Authentication module for managing the client session.
//!
//! This module provides:
//! - `Session`: the session value and its pure transition function
//! - `SessionHandle`: the single owned container, with persistence side effects
//! - `SessionManager`: restore, login, register, logout and profile operations
//! - `CredentialStore`: durable storage for the `token` + `user` pair
//! - `access`: role requirements, route guards and navigation filtering
//!
//! A stored credential is only trusted after the server confirms it.

pub mod access;
pub mod handle;
pub mod manager;
pub mod session;
pub mod store;

pub use access::{guard, navigation, Access, Capability, GuardDecision, InterviewView, NavItem, Route};
pub use handle::{AuthNotice, SessionHandle};
pub use manager::{SessionError, SessionManager};
pub use session::{Session, SessionEvent, SessionPhase};
pub use store::{
    CredentialStore, FileCredentialStore, KeyringCredentialStore, MemoryCredentialStore,
    PersistedCredentials,
};
