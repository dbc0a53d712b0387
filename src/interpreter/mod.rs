//! Response Interpreter
//!
//! Turns the free-text answer of the analysis service into a complete
//! `AnalysisResult`. Interpretation never fails: whatever the text lacks
//! is synthesized, so the output is always well-formed.

pub mod insights;
pub mod scores;

pub use insights::{InsightExtractor, InsightKind, KeywordSentenceExtractor, SectionExtractor};
pub use scores::{AnchoredScore, LabeledScore, PositionalScore, ScoreExtractor};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::analysis::{AnalysisResult, Dimension, DimensionScores};

pub struct ResponseInterpreter {
    score_chain: Vec<Box<dyn ScoreExtractor>>,
    insight_chain: Vec<Box<dyn InsightExtractor>>,
    seed: Option<u64>,
}

impl ResponseInterpreter {
    pub fn new() -> Self {
        Self {
            score_chain: scores::default_chain(),
            insight_chain: insights::default_chain(),
            seed: None,
        }
    }

    /// Fixes the seed used for synthesized scores, making interpretation repeatable
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Appends a score strategy after the built-in ones
    pub fn with_score_extractor(mut self, extractor: Box<dyn ScoreExtractor>) -> Self {
        self.score_chain.push(extractor);
        self
    }

    pub fn with_insight_extractor(mut self, extractor: Box<dyn InsightExtractor>) -> Self {
        self.insight_chain.push(extractor);
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn parsed_score(&self, text: &str, dimension: Dimension) -> Option<u8> {
        self.score_chain.iter().find_map(|extractor| {
            let score = extractor.extract(text, dimension)?;
            debug!("{} score {} via {} extractor", dimension, score, extractor.name());
            Some(score)
        })
    }

    pub fn extract_scores(&self, text: &str) -> DimensionScores {
        let mut rng = self.rng();
        let mut result = DimensionScores::default();
        for dimension in Dimension::ALL {
            let score = self.parsed_score(text, dimension).unwrap_or_else(|| {
                let synthetic = scores::synthesize_score(dimension, &mut rng);
                debug!("{} score synthesized as {}", dimension, synthetic);
                synthetic
            });
            result.set(dimension, score);
        }
        result
    }

    /// Never empty: falls back to generic placeholder statements
    pub fn extract_insights(&self, text: &str, kind: InsightKind) -> Vec<String> {
        self.insight_chain
            .iter()
            .find_map(|extractor| {
                let items = extractor.extract(text, kind)?;
                debug!("{} {} via {} extractor", items.len(), kind, extractor.name());
                Some(items)
            })
            .unwrap_or_else(|| kind.placeholders())
    }

    /// Whether the text carries anything the extractors can use. Synthesis and
    /// sentiment scanning do not count.
    pub fn has_signal(&self, text: &str) -> bool {
        if !scores::score_tokens(text).is_empty() {
            return true;
        }
        InsightKind::ALL
            .iter()
            .any(|kind| SectionExtractor.extract(text, *kind).is_some())
    }

    pub fn interpret(&self, text: &str) -> AnalysisResult {
        let scores = self.extract_scores(text);
        let mut result = AnalysisResult::from_scores(
            scores,
            self.extract_insights(text, InsightKind::Strengths),
            self.extract_insights(text, InsightKind::Concerns),
            self.extract_insights(text, InsightKind::Recommendations),
        );
        result.raw_response = Some(text.to_string());
        result
    }
}

impl Default for ResponseInterpreter {
    fn default() -> Self {
        Self::new()
    }
}
