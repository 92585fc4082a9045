//! portal_core - Shared types for the InsureDocs portal client
//!
//! This crate provides the foundations used by the client and CLI crates:
//! - `config` - Config loading (config file + environment overrides)
//! - `paths` - Well-known locations under `~/.insuredocs`
//! - `models` - Typed backend records (users, documents, utility endpoints)

pub mod config;
pub mod models;
pub mod paths;

// Re-export commonly used types
pub use config::{Config, DEFAULT_API_BASE};
pub use models::{
    BackendStatus, CalculationRequest, CalculationResult, DashboardStats, Document,
    DocumentQuery, DocumentStatus, DocumentSummary, FileProcessingResult, RegistrationResponse,
    Role, Session, TokenResponse, UserRecord,
};
