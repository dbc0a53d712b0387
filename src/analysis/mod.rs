//! Analysis Module
//!
//! Result types shared by the interpreter, the backends and the presentation layer.

mod types;
pub mod roster;

pub use roster::AgentRole;
pub use types::{
    AgentResponse, AgentStatus, AnalysisResult, Dimension, DimensionScores, Interpretation,
    ScoreBand,
};
