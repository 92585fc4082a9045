use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{error, info, warn};
use portal_core::{Session, UserRecord};
use tokio::sync::RwLock;

use super::state::{AuthState, RegistrationOutcome, RestorePolicy, SessionSnapshot};
use crate::error::{ClientError, Result};
use crate::gateway::Gateway;
use crate::storage::CredentialStore;

const NO_USER_DATA: &str = "Login successful, but no user data received.";
const NO_CREDENTIAL: &str = "Login response did not include an access token.";

/// Clears the loading flag on every exit path.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Owns the process-wide session and its persisted copy.
///
/// Operations are not serialized against each other: a login racing a
/// logout can leave storage and memory disagreeing.
pub struct SessionManager {
    gateway: Arc<Gateway>,
    store: CredentialStore,
    policy: RestorePolicy,
    state: RwLock<AuthState>,
    loading: AtomicBool,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("policy", &self.policy)
            .field("loading", &self.loading)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Starts in [`AuthState::Initializing`]; call [`restore`](Self::restore) next.
    pub fn new(gateway: Arc<Gateway>) -> Self {
        let store = gateway.credentials().clone();
        Self {
            gateway,
            store,
            policy: RestorePolicy::default(),
            state: RwLock::new(AuthState::Initializing),
            loading: AtomicBool::new(true),
        }
    }

    pub fn with_policy(mut self, policy: RestorePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    /// Loads the stored session. Missing or corrupt entries are discarded.
    pub async fn restore(&self) -> AuthState {
        let _loading = LoadingGuard::start(&self.loading);

        let restored = match (self.read_stored_session(), self.policy) {
            (Some(stored), RestorePolicy::Verify) => self.verify_stored(stored).await,
            (stored, _) => stored,
        };

        let next = match restored {
            Some(session) => {
                info!("Restored session for {}", session.email);
                AuthState::Authenticated(session)
            }
            None => AuthState::Unauthenticated,
        };
        *self.state.write().await = next.clone();
        next
    }

    fn read_stored_session(&self) -> Option<Session> {
        match (self.store.token(), self.store.raw_session()) {
            (Ok(Some(_)), Ok(Some(raw))) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!("Failed to parse stored user data, logging out: {e}");
                    self.discard_stored();
                    None
                }
            },
            (Ok(None), Ok(None)) => None,
            (token, raw) => {
                if let Err(e) = token.as_ref().and(raw.as_ref()) {
                    warn!("Failed to read stored session: {e}");
                } else {
                    warn!("Stored session is incomplete, discarding it");
                }
                self.discard_stored();
                None
            }
        }
    }

    async fn verify_stored(&self, stored: Session) -> Option<Session> {
        match self.gateway.current_user().await {
            Ok(user) => {
                let fresh = Session::from(&user);
                if fresh != stored {
                    info!("Stored session for {} refreshed from backend", fresh.email);
                    if let Err(e) = self.persist_current_token(&fresh) {
                        warn!("Failed to persist refreshed session: {e}");
                    }
                }
                Some(fresh)
            }
            Err(e) => {
                warn!("Failed to verify stored token, logging out: {e}");
                self.discard_stored();
                None
            }
        }
    }

    fn persist_current_token(&self, session: &Session) -> Result<()> {
        let token = self
            .store
            .token()?
            .ok_or_else(|| ClientError::Storage("stored token disappeared".to_string()))?;
        self.store.save(&token, session)
    }

    pub async fn login(&self, identifier: &str, secret: &str) -> Result<Session> {
        let _loading = LoadingGuard::start(&self.loading);

        match self.exchange_credentials(identifier, secret).await {
            Ok(session) => {
                info!("User logged in: {} ({})", session.email, session.role);
                *self.state.write().await = AuthState::Authenticated(session.clone());
                Ok(session)
            }
            Err(e) => {
                error!("Login failed: {e}");
                self.discard_stored();
                *self.state.write().await = AuthState::Unauthenticated;
                Err(e)
            }
        }
    }

    async fn exchange_credentials(&self, identifier: &str, secret: &str) -> Result<Session> {
        let response = self.gateway.token_exchange(identifier, secret).await?;
        let token = response.access_token.trim();

        let user: UserRecord = match response.user {
            Some(user) if !token.is_empty() => user,
            Some(_) => return Err(ClientError::Invariant(NO_CREDENTIAL.to_string())),
            None if !token.is_empty() => {
                // The lookup is authorized with the fresh token.
                self.store.set_token(token)?;
                self.gateway.current_user().await?
            }
            None => return Err(ClientError::Invariant(NO_USER_DATA.to_string())),
        };

        let session = Session::from(&user);
        self.store.save(token, &session)?;
        Ok(session)
    }

    pub async fn register(
        &self,
        name: &str,
        identifier: &str,
        secret: &str,
    ) -> Result<RegistrationOutcome> {
        let _loading = LoadingGuard::start(&self.loading);

        let response = self
            .gateway
            .register(name, identifier, secret)
            .await
            .map_err(|e| {
                error!("Registration failed: {e}");
                e
            })?;

        match (response.credential().map(str::trim), response.user()) {
            (Some(token), Some(user)) if !token.is_empty() => {
                let session = Session::from(user);
                self.store.save(token, &session)?;
                info!("Registered and logged in: {}", session.email);
                *self.state.write().await = AuthState::Authenticated(session.clone());
                Ok(RegistrationOutcome::SignedIn(session))
            }
            _ => {
                info!("Registration successful. Please log in.");
                Ok(RegistrationOutcome::LoginRequired)
            }
        }
    }

    /// Clears storage and memory. Safe to call repeatedly.
    pub async fn logout(&self) -> Result<()> {
        let cleared = self.store.clear();
        *self.state.write().await = AuthState::Unauthenticated;
        info!("User logged out");
        cleared
    }

    fn discard_stored(&self) {
        if let Err(e) = self.store.clear() {
            warn!("Failed to clear stored session: {e}");
        }
    }

    pub async fn state(&self) -> AuthState {
        self.state.read().await.clone()
    }

    pub async fn session(&self) -> Option<Session> {
        self.state.read().await.session().cloned()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    pub async fn is_administrator(&self) -> bool {
        self.state.read().await.is_administrator()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state().await,
            is_loading: self.is_loading(),
        }
    }
}
