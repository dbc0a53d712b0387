//! Orchestrator Module
//!
//! Runs an analysis end to end: backend fallthrough, the progress
//! timelines and the terminal front end.

pub mod cli;
pub mod pipeline;
pub mod progress;

pub use pipeline::{AnalysisPipeline, PipelineError};
pub use progress::{
    reconcile, AnalysisOutcome, FlowState, ProgressRunner, ProgressSnapshot, ProgressTracker,
    StageSpec, StageStatus, STAGES,
};
