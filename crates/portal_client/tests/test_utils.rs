//! Shared helpers for the gateway and session integration tests

#![allow(dead_code)]

use std::sync::Arc;

use portal_client::{CredentialStore, Gateway, RecordingNotifier, SessionManager};
use reqwest::Client as ReqwestClient;
use wiremock::MockServer;

/// Everything a test needs to drive the client against a mock backend.
pub struct Harness {
    pub server: MockServer,
    pub store: CredentialStore,
    pub notifier: Arc<RecordingNotifier>,
    pub gateway: Arc<Gateway>,
}

impl Harness {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base = server.uri();
        Self::with_base(server, &base)
    }

    /// Harness whose gateway reads credentials from `store`.
    pub async fn with_store(store: CredentialStore) -> Self {
        let server = MockServer::start().await;
        let base = server.uri();
        Self::build(server, &base, store)
    }

    /// Gateway pointed at `base` instead of the mock server.
    pub fn with_base(server: MockServer, base: &str) -> Self {
        Self::build(server, base, CredentialStore::in_memory())
    }

    fn build(server: MockServer, base: &str, store: CredentialStore) -> Self {
        let notifier = Arc::new(RecordingNotifier::new());
        let gateway = Arc::new(Gateway::with_client(
            test_http_client(),
            base,
            store.clone(),
            notifier.clone(),
        ));
        Self {
            server,
            store,
            notifier,
            gateway,
        }
    }

    pub fn session_manager(&self) -> SessionManager {
        SessionManager::new(Arc::clone(&self.gateway))
    }

    pub fn errors(&self) -> Vec<String> {
        self.notifier.errors()
    }
}

pub fn test_http_client() -> ReqwestClient {
    ReqwestClient::builder()
        .no_proxy()
        .build()
        .expect("Failed to build HTTP client")
}

/// Mock backend payloads
pub struct MockResponseBuilder;

impl MockResponseBuilder {
    pub fn user(id: i64, full_name: &str, email: &str, role: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "full_name": full_name,
            "email": email,
            "role": role,
            "is_active": true,
            "created_at": "2024-01-15T10:00:00.000000"
        })
    }

    pub fn regular_user() -> serde_json::Value {
        Self::user(2, "Regular User", "user@insurance.com", "user")
    }

    pub fn admin_user() -> serde_json::Value {
        Self::user(1, "Admin User", "admin@insurance.com", "admin")
    }

    pub fn token_with_user(token: &str, user: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "access_token": token,
            "token_type": "bearer",
            "user": user
        })
    }

    pub fn token_only(token: &str) -> serde_json::Value {
        serde_json::json!({
            "access_token": token,
            "token_type": "bearer"
        })
    }

    pub fn detail(message: &str) -> serde_json::Value {
        serde_json::json!({ "detail": message })
    }

    pub fn document_summary(id: i64, filename: &str, status: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "original_filename": filename,
            "upload_date": "2024-06-10T08:15:00.000001",
            "size_kb": 120,
            "status": status
        })
    }

    pub fn document(id: i64, filename: &str, status: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "original_filename": filename,
            "content_type": "application/pdf",
            "size_kb": 120,
            "stored_filename": format!("{id}_{filename}"),
            "file_path_on_disk": format!("{id}_{filename}"),
            "status": status,
            "upload_date": "2024-06-10T08:15:00.000001",
            "owner_id": 2,
            "extracted_text_path": null,
            "extracted_metadata": {"policy_number": "PN-1234"}
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_response_builder() {
        let token = MockResponseBuilder::token_with_user("T1", MockResponseBuilder::regular_user());
        assert_eq!(token["access_token"], "T1");
        assert_eq!(token["user"]["role"], "user");

        let admin = MockResponseBuilder::admin_user();
        assert_eq!(admin["role"], "admin");

        let document = MockResponseBuilder::document(5, "claim.pdf", "uploaded");
        assert_eq!(document["stored_filename"], "5_claim.pdf");
    }

    #[tokio::test]
    async fn test_harness_starts_with_empty_store() {
        let harness = Harness::start().await;
        assert_eq!(harness.store.token().expect("token"), None);
        assert!(harness.errors().is_empty());
    }
}
