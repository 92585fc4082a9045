use portal_core::{Config, Session};

/// Authentication lifecycle of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Before the stored session has been looked at.
    Initializing,
    Unauthenticated,
    Authenticated(Session),
}

impl AuthState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn is_administrator(&self) -> bool {
        self.session().is_some_and(Session::is_admin)
    }
}

/// Read-only copy of the manager's state handed to consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: AuthState,
    pub is_loading: bool,
}

impl SessionSnapshot {
    pub fn user(&self) -> Option<&Session> {
        self.state.session()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn is_administrator(&self) -> bool {
        self.state.is_administrator()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The backend returned a credential and the new account is signed in.
    SignedIn(Session),
    /// The account exists but the caller has to log in.
    LoginRequired,
}

impl RegistrationOutcome {
    pub const LOGIN_REQUIRED_MESSAGE: &'static str = "Registration successful! Please log in.";

    pub fn message(&self) -> String {
        match self {
            RegistrationOutcome::SignedIn(session) => format!("Welcome, {}!", session.name),
            RegistrationOutcome::LoginRequired => Self::LOGIN_REQUIRED_MESSAGE.to_string(),
        }
    }
}

/// What `restore` does with a stored session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RestorePolicy {
    /// Trust the stored record until a call is rejected.
    #[default]
    Trust,
    /// Re-fetch `/auth/me` and drop the session if that fails.
    Verify,
}

impl RestorePolicy {
    pub fn from_config(config: &Config) -> Self {
        if config.verify_session {
            RestorePolicy::Verify
        } else {
            RestorePolicy::Trust
        }
    }
}
