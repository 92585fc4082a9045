use portal_core::{BackendStatus, CalculationRequest, CalculationResult, FileProcessingResult};

use crate::error::Result;
use crate::gateway::{FilePart, Gateway};

pub const STATUS_PATH: &str = "/utils/status";
pub const CALCULATE_PATH: &str = "/utils/calculate";
pub const PROCESS_FILE_PATH: &str = "/utils/process-file";

impl Gateway {
    pub async fn backend_status(&self) -> Result<BackendStatus> {
        self.get_public(STATUS_PATH).await
    }

    pub async fn calculate(&self, request: &CalculationRequest) -> Result<CalculationResult> {
        self.post_json(CALCULATE_PATH, request).await
    }

    pub async fn process_file(&self, file: FilePart) -> Result<FileProcessingResult> {
        self.upload_file(PROCESS_FILE_PATH, file, Vec::new()).await
    }
}
