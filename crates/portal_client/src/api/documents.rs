use portal_core::{DashboardStats, Document, DocumentQuery, DocumentStatus, DocumentSummary};
use serde::Serialize;

use crate::error::Result;
use crate::gateway::{ApiRequest, FilePart, Gateway};

pub const DOCUMENTS_PATH: &str = "/documents";
pub const DOCUMENTS_UPLOAD_PATH: &str = "/documents/";
const DASHBOARD_STATS_PATH: &str = "/documents/stats/dashboard";

#[derive(Debug, Serialize)]
struct StatusUpdate {
    status: DocumentStatus,
}

fn document_path(id: i64) -> String {
    format!("{DOCUMENTS_PATH}/{id}")
}

impl Gateway {
    pub async fn list_documents(&self, query: &DocumentQuery) -> Result<Vec<DocumentSummary>> {
        self.fetch(ApiRequest::get(DOCUMENTS_PATH).query(query.to_pairs()))
            .await
    }

    pub async fn upload_document(&self, file: FilePart) -> Result<Document> {
        self.upload_file(DOCUMENTS_UPLOAD_PATH, file, Vec::new())
            .await
    }

    pub async fn get_document(&self, id: i64) -> Result<Document> {
        self.get(&document_path(id)).await
    }

    /// Administrator only.
    pub async fn update_document_status(&self, id: i64, status: DocumentStatus) -> Result<Document> {
        let path = format!("{}/status", document_path(id));
        self.patch_json(&path, &StatusUpdate { status }).await
    }

    /// Administrator only. The backend answers 204.
    pub async fn delete_document(&self, id: i64) -> Result<()> {
        self.delete(&document_path(id)).await
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        self.get(DASHBOARD_STATS_PATH).await
    }
}
