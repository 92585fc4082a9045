//! Typed endpoint wrappers built on [`Gateway`](crate::gateway::Gateway).

mod auth;
mod documents;
mod users;
mod utils;

pub use auth::{ME_PATH, REGISTER_PATH, TOKEN_PATH};
pub use documents::{DOCUMENTS_PATH, DOCUMENTS_UPLOAD_PATH};
pub use users::USERS_PATH;
pub use utils::{CALCULATE_PATH, PROCESS_FILE_PATH, STATUS_PATH};
