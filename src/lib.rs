//! GulfValidate
//!
//! Startup validation for Gulf markets:
//! - Four-step intake wizard producing an immutable analysis request
//! - Session client for a hosted multi-agent analysis service
//! - Heuristic interpretation of free-text answers into six scores and insights
//! - Fallback backend and concurrent progress tracking
//! - Local persistence, share links and paginated report export

pub mod analysis;
pub mod backend;
pub mod config;
pub mod intake;
pub mod interpreter;
pub mod orchestrator;
pub mod services;
pub mod utils;

// Re-exports for convenience
pub use analysis::{AnalysisResult, Dimension, DimensionScores, Interpretation};
pub use backend::{AnalysisBackend, BackendError};
pub use config::AppConfig;
pub use intake::{AnalysisRequest, Wizard};
pub use interpreter::ResponseInterpreter;
pub use orchestrator::{AnalysisPipeline, PipelineError, ProgressRunner};
pub use services::LocalStore;
