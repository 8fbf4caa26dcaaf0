//! Session lifecycle for the client.
//!
//! The store owns the single answer to "who is signed in". It restores a
//! persisted session at startup, commits logins and registrations, and
//! tears everything down on logout. All transitions happen under one lock,
//! which is never held across an await.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::client::{AuthSession, ResourceClient};
use crate::errors::ApiError;
use crate::models::{Credentials, Principal, RegisterRequest};

/// Where the session lifecycle currently stands.
#[derive(Debug, Clone)]
pub enum SessionStatus {
    /// Startup restore has not resolved yet
    Restoring,
    /// Nobody is signed in
    Anonymous,
    /// A hospital account is signed in
    Authenticated(Principal),
}

/// Session record persisted across restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredSession {
    pub principal: Principal,
    pub token: String,
}

struct SessionState {
    status: SessionStatus,
    /// Bumped by every logout. A login commits only if the epoch it started
    /// under is still current, so a logout always beats an in-flight login.
    epoch: u64,
}

/// Single source of truth for the authenticated principal.
pub struct SessionStore {
    client: Arc<ResourceClient>,
    session_path: PathBuf,
    state: Mutex<SessionState>,
}

impl SessionStore {
    pub fn new(client: Arc<ResourceClient>, session_path: PathBuf) -> Self {
        Self {
            client,
            session_path,
            state: Mutex::new(SessionState {
                status: SessionStatus::Restoring,
                epoch: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().expect("session state lock poisoned")
    }

    /// Current lifecycle status.
    pub fn status(&self) -> SessionStatus {
        self.lock().status.clone()
    }

    /// The signed-in principal, if any.
    pub fn current(&self) -> Option<Principal> {
        match &self.lock().status {
            SessionStatus::Authenticated(principal) => Some(principal.clone()),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.lock().status, SessionStatus::Authenticated(_))
    }

    /// Resolve the startup state from the persisted session, if one exists.
    ///
    /// Never fails: a missing, unreadable, or malformed session file just
    /// resolves to signed out. Does nothing if a login or logout already
    /// settled the session in the meantime.
    pub async fn restore(&self) -> Option<Principal> {
        let restored: Option<StoredSession> = match tokio::fs::read(&self.session_path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(session) => Some(session),
                Err(err) => {
                    tracing::warn!("Session file is malformed, starting signed out: {}", err);
                    None
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!("Could not read session file, starting signed out: {}", err);
                None
            }
        };

        let mut state = self.lock();
        if !matches!(state.status, SessionStatus::Restoring) {
            return None;
        }
        match restored {
            Some(session) => {
                self.client.set_session_token(Some(session.token));
                state.status = SessionStatus::Authenticated(session.principal.clone());
                tracing::info!("Restored session for {}", session.principal.display_name);
                Some(session.principal)
            }
            None => {
                state.status = SessionStatus::Anonymous;
                None
            }
        }
    }

    /// Sign in with credentials.
    ///
    /// On rejected credentials the session stays exactly as it was and no
    /// storage write happens. A logout issued while this call is in flight
    /// wins: the login result is discarded and an authentication error is
    /// returned.
    pub async fn login(&self, credentials: &Credentials) -> Result<Principal, ApiError> {
        let epoch = self.lock().epoch;
        let auth = self.client.authenticate(credentials).await?;
        let Some(auth) = auth else {
            tracing::debug!("Login rejected for {}", credentials.username);
            return Err(ApiError::AuthenticationFailed(
                "invalid username or password".to_string(),
            ));
        };
        self.commit(auth, epoch).await
    }

    /// Create an account and sign it in, with the same commit rules as
    /// [`login`](Self::login).
    pub async fn register(&self, request: &RegisterRequest) -> Result<Principal, ApiError> {
        let epoch = self.lock().epoch;
        let auth = self.client.register(request).await?;
        self.commit(auth, epoch).await
    }

    /// Sign out. Local state is cleared first; the backend call afterwards
    /// is best effort. Idempotent: signing out while signed out is a no-op.
    pub async fn logout(&self) {
        let had_session = {
            let mut state = self.lock();
            state.epoch += 1;
            let had_session = matches!(state.status, SessionStatus::Authenticated(_));
            state.status = SessionStatus::Anonymous;
            had_session
        };
        self.remove_session_file().await;
        if !had_session {
            return;
        }
        match self.client.end_session().await {
            Ok(()) => tracing::info!("Signed out"),
            Err(err) => {
                tracing::warn!("Backend logout failed, local session already cleared: {}", err)
            }
        }
    }

    /// Make an authentication result the active session, unless a logout
    /// has intervened since `epoch` was read.
    async fn commit(&self, auth: AuthSession, epoch: u64) -> Result<Principal, ApiError> {
        let record = StoredSession {
            principal: auth.principal.clone(),
            token: auth.token.clone(),
        };
        let persist_error = self.persist(&record).await.err();

        let committed = {
            let mut state = self.lock();
            if state.epoch != epoch {
                false
            } else {
                state.status = SessionStatus::Authenticated(auth.principal.clone());
                self.client.set_session_token(Some(auth.token));
                true
            }
        };

        if !committed {
            // A logout raced this login and wins; take back the file write.
            self.remove_session_file().await;
            tracing::debug!("Login superseded by logout, discarding session");
            return Err(ApiError::AuthenticationFailed(
                "signed out before login completed".to_string(),
            ));
        }

        if let Some(err) = persist_error {
            tracing::warn!(
                "Failed to persist session, it will not survive a restart: {}",
                err
            );
        }
        tracing::info!("Signed in as {}", auth.principal.display_name);
        Ok(auth.principal)
    }

    async fn persist(&self, record: &StoredSession) -> std::io::Result<()> {
        if let Some(parent) = self.session_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(record)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        tokio::fs::write(&self.session_path, bytes).await
    }

    async fn remove_session_file(&self) {
        if let Err(err) = tokio::fs::remove_file(&self.session_path).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove session file: {}", err);
            }
        }
    }
}
