//! Typed records exchanged with the backend.

mod document;
mod timestamp;
mod user;
mod utility;

pub use document::{DashboardStats, Document, DocumentQuery, DocumentStatus, DocumentSummary};
pub use user::{RegistrationResponse, Role, Session, TokenResponse, UserRecord};
pub use utility::{BackendStatus, CalculationRequest, CalculationResult, FileProcessingResult};
