//! Intake Module
//!
//! Builds the immutable analysis request from the four-step form.

pub mod request;
pub mod wizard;

pub use request::{
    AnalysisRequest, BusinessModel, BusinessStage, DocumentAttachment, DocumentKind, TargetMarket,
};
pub use wizard::{Wizard, WizardStep};

pub type IntakeResult<T> = Result<T, IntakeError>;

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Business description has {len} characters, at least {min} are required")]
    DescriptionTooShort { len: usize, min: usize },

    #[error("Unknown {field} option: '{value}'")]
    UnknownOption { field: &'static str, value: String },

    #[error("Unsupported document type: {0} (accepted: PDF, DOC, DOCX, TXT)")]
    UnsupportedDocument(String),

    #[error("Document is {size} bytes, the limit is {max} bytes")]
    DocumentTooLarge { size: u64, max: u64 },

    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),
}
