mod manager;
mod state;

pub use manager::SessionManager;
pub use state::{AuthState, RegistrationOutcome, RestorePolicy, SessionSnapshot};
