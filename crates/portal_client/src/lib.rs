//! portal_client - Request gateway and session manager for the InsureDocs backend
//!
//! - `gateway` - the single chokepoint for HTTP calls (auth header, body
//!   encoding, response normalization, failure notifications)
//! - `api` - typed endpoint wrappers (auth, documents, users, utils)
//! - `session` - authentication lifecycle persisted through `storage`
//! - `notify` - notification port the gateway reports failures through

pub mod api;
pub mod error;
pub mod gateway;
pub mod notify;
pub mod session;
pub mod storage;

use std::sync::Arc;

pub use error::{ClientError, Result};
pub use gateway::{ApiRequest, FilePart, Gateway, MultipartPayload, RequestBody};
pub use notify::{LogNotifier, Notification, NotificationLevel, Notifier, NullNotifier, RecordingNotifier};
pub use portal_core::Config;
pub use session::{AuthState, RegistrationOutcome, RestorePolicy, SessionManager, SessionSnapshot};
pub use storage::{CredentialStore, FileStore, KeyValueStore, MemoryStore};

/// Wires a file-backed session store, gateway and session manager from `config`.
pub fn connect(config: &Config, notifier: Arc<dyn Notifier>) -> Result<SessionManager> {
    let store = CredentialStore::new(Arc::new(FileStore::new(config.session_dir())));
    let gateway = Gateway::from_config(config, store, notifier)?;
    Ok(SessionManager::new(Arc::new(gateway)).with_policy(RestorePolicy::from_config(config)))
}
