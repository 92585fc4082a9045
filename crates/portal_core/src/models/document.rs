use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// Processing pipeline state of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Uploaded,
    OcrPending,
    OcrProcessing,
    OcrCompleted,
    OcrFailed,
    ExtractPending,
    ExtractProcessing,
    ExtractCompleted,
    ExtractFailed,
    Approved,
    Rejected,
}

impl DocumentStatus {
    pub const ALL: [DocumentStatus; 11] = [
        DocumentStatus::Uploaded,
        DocumentStatus::OcrPending,
        DocumentStatus::OcrProcessing,
        DocumentStatus::OcrCompleted,
        DocumentStatus::OcrFailed,
        DocumentStatus::ExtractPending,
        DocumentStatus::ExtractProcessing,
        DocumentStatus::ExtractCompleted,
        DocumentStatus::ExtractFailed,
        DocumentStatus::Approved,
        DocumentStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Uploaded => "uploaded",
            DocumentStatus::OcrPending => "ocr_pending",
            DocumentStatus::OcrProcessing => "ocr_processing",
            DocumentStatus::OcrCompleted => "ocr_completed",
            DocumentStatus::OcrFailed => "ocr_failed",
            DocumentStatus::ExtractPending => "extract_pending",
            DocumentStatus::ExtractProcessing => "extract_processing",
            DocumentStatus::ExtractCompleted => "extract_completed",
            DocumentStatus::ExtractFailed => "extract_failed",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DocumentStatus::OcrFailed | DocumentStatus::ExtractFailed)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| format!("unknown document status: {s}"))
    }
}

/// Row of the `/documents` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: i64,
    pub original_filename: String,
    #[serde(with = "timestamp")]
    pub upload_date: DateTime<Utc>,
    #[serde(default)]
    pub size_kb: Option<i64>,
    pub status: DocumentStatus,
}

/// Full document detail, returned by upload, detail and status updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub original_filename: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size_kb: Option<i64>,
    pub stored_filename: String,
    pub file_path_on_disk: String,
    pub status: DocumentStatus,
    #[serde(with = "timestamp")]
    pub upload_date: DateTime<Utc>,
    pub owner_id: i64,
    #[serde(default)]
    pub extracted_text_path: Option<String>,
    #[serde(default)]
    pub extracted_metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    pub total_documents: u64,
    pub recent_uploads_30_days: u64,
    pub pending_ocr_count: u64,
    pub processing_ocr_count: u64,
    #[serde(alias = "pending_extraction_count")]
    pub pending_ner_count: u64,
    #[serde(alias = "processing_extraction_count")]
    pub processing_ner_count: u64,
    pub completed_ner_count: u64,
    pub failed_ocr_count: u64,
    pub failed_ner_count: u64,
}

/// Query parameters accepted by the document list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub search_term: Option<String>,
    pub status: Option<DocumentStatus>,
}

impl DocumentQuery {
    pub fn page(skip: u32, limit: u32) -> Self {
        Self {
            skip: Some(skip),
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Pairs in the order the caller set them; unset fields are omitted.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(skip) = self.skip {
            pairs.push(("skip".to_string(), skip.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(term) = self.search_term.as_deref().filter(|t| !t.trim().is_empty()) {
            pairs.push(("search_term".to_string(), term.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status_filter".to_string(), status.as_str().to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_round_trips_through_str() {
        for status in DocumentStatus::ALL {
            assert_eq!(status.as_str().parse::<DocumentStatus>(), Ok(status));
        }
        assert!("archived".parse::<DocumentStatus>().is_err());
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(DocumentStatus::ExtractCompleted).expect("serialize"),
            json!("extract_completed")
        );
    }

    #[test]
    fn summary_parses_backend_row() {
        let row = json!({
            "id": 11,
            "original_filename": "policy.pdf",
            "upload_date": "2024-06-10T08:15:00.000001",
            "size_kb": 120,
            "status": "ocr_completed"
        });
        let summary: DocumentSummary = serde_json::from_value(row).expect("summary");
        assert_eq!(summary.status, DocumentStatus::OcrCompleted);
        assert_eq!(summary.size_kb, Some(120));
    }

    #[test]
    fn summary_parses_rejected_row() {
        let row = json!({
            "id": 12,
            "original_filename": "claim.pdf",
            "upload_date": "2024-06-11T09:00:00.000000",
            "status": "rejected"
        });
        let summary: DocumentSummary = serde_json::from_value(row).expect("summary");
        assert_eq!(summary.status, DocumentStatus::Rejected);
        assert!(!summary.status.is_failed());
        assert_eq!("rejected".parse::<DocumentStatus>(), Ok(DocumentStatus::Rejected));
    }

    #[test]
    fn dashboard_stats_default_missing_counters() {
        let stats: DashboardStats =
            serde_json::from_value(json!({"total_documents": 4})).expect("stats");
        assert_eq!(stats.total_documents, 4);
        assert_eq!(stats.failed_ner_count, 0);
    }

    #[test]
    fn dashboard_stats_parse_backend_counters() {
        let stats: DashboardStats = serde_json::from_value(json!({
            "total_documents": 12,
            "recent_uploads_30_days": 7,
            "pending_ocr_count": 2,
            "processing_ocr_count": 1,
            "pending_ner_count": 3,
            "processing_ner_count": 0,
            "completed_ner_count": 4,
            "failed_ocr_count": 1,
            "failed_ner_count": 1
        }))
        .expect("stats");
        assert_eq!(stats.completed_ner_count, 4);
        assert_eq!(stats.failed_ocr_count, 1);
        assert_eq!(stats.pending_ner_count, 3);

        let legacy: DashboardStats =
            serde_json::from_value(json!({"pending_extraction_count": 5})).expect("stats");
        assert_eq!(legacy.pending_ner_count, 5);
    }

    #[test]
    fn query_pairs_skip_unset_fields() {
        assert!(DocumentQuery::default().to_pairs().is_empty());

        let query = DocumentQuery {
            search_term: Some("claim".to_string()),
            status: Some(DocumentStatus::Approved),
            ..DocumentQuery::page(20, 10)
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("skip".to_string(), "20".to_string()),
                ("limit".to_string(), "10".to_string()),
                ("search_term".to_string(), "claim".to_string()),
                ("status_filter".to_string(), "approved".to_string()),
            ]
        );
    }
}
