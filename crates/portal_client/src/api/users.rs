use portal_core::UserRecord;

use crate::error::Result;
use crate::gateway::{ApiRequest, Gateway};

pub const USERS_PATH: &str = "/users/";

impl Gateway {
    /// Administrator only.
    pub async fn list_users(&self, skip: u32, limit: u32) -> Result<Vec<UserRecord>> {
        let request = ApiRequest::get(USERS_PATH)
            .query([("skip", skip.to_string()), ("limit", limit.to_string())]);
        self.fetch(request).await
    }
}
