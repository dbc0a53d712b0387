//! Score Extractors
//!
//! Independent strategies that each try to recover one dimension score
//! from free text. The interpreter runs them in order, first success wins.

use rand::Rng;
use regex::Regex;

use crate::analysis::Dimension;

lazy_static::lazy_static! {
    /// A number immediately followed by "/100" or "%". The leading group keeps
    /// the fractional digits of "72.5" from reading as a score of their own.
    static ref SCORE_TOKEN: Regex =
        Regex::new(r"(?:^|[^\w.])(\d{1,3}(?:\.\d+)?)(?:\s*/\s*100|\s*%)").unwrap();

    static ref ANCHORED: [Regex; 6] = Dimension::ALL.map(anchored_pattern);
    static ref LABELED: [Regex; 6] = Dimension::ALL.map(labeled_pattern);
}

/// Maximum distance between a dimension keyword and its score
const LABEL_WINDOW: usize = 60;

/// Random spread applied around the per-dimension baseline
pub const SYNTHETIC_SPREAD: i32 = 10;

fn dimension_keywords(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Market => r"markets?",
        Dimension::Financial => r"financ\w*",
        Dimension::Technical => r"technic\w*|technolog\w*",
        Dimension::Legal => r"legal|regulat\w*|compliance",
        Dimension::Cultural => r"cultur\w*",
        Dimension::Competitive => r"compet\w*",
    }
}

/// "Market Score: 90/100", "Competitive Position Rating - 66%"
fn anchored_pattern(dimension: Dimension) -> Regex {
    let pattern = format!(
        r"(?i)\b(?:{})\b(?:[ \t/&-]+\w+){{0,2}}?[ \t]+(?:score|rating)\b[^\n\d]{{0,20}}?(\d{{1,3}}(?:\.\d+)?)(?:\s*/\s*100|\s*%|\b)",
        dimension_keywords(dimension)
    );
    Regex::new(&pattern).unwrap()
}

fn labeled_pattern(dimension: Dimension) -> Regex {
    // No digits or line breaks between label and score, so the first number
    // after the keyword on the same line is the one taken.
    let pattern = format!(
        r"(?i)\b(?:{})\b[^\n\d]{{0,{}}}?(\d{{1,3}}(?:\.\d+)?)(?:\s*/\s*100|\s*%)",
        dimension_keywords(dimension),
        LABEL_WINDOW
    );
    Regex::new(&pattern).unwrap()
}

/// Decimal scores are rounded, anything outside 0..=100 is rejected
fn parse_score(raw: &str) -> Option<u8> {
    let value = raw.parse::<f64>().ok()?;
    (0.0..=100.0).contains(&value).then(|| value.round() as u8)
}

fn first_score(pattern: &Regex, text: &str) -> Option<u8> {
    pattern
        .captures_iter(text)
        .filter_map(|c| c.get(1).and_then(|m| parse_score(m.as_str())))
        .next()
}

/// Every generic score token in the text, in position order
pub fn score_tokens(text: &str) -> Vec<&str> {
    SCORE_TOKEN
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

pub trait ScoreExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns a 0-100 score for `dimension`, or `None` when this strategy finds nothing
    fn extract(&self, text: &str, dimension: Dimension) -> Option<u8>;
}

/// A dimension keyword followed by "score" or "rating", the heading form the prompt asks for
pub struct AnchoredScore;

impl ScoreExtractor for AnchoredScore {
    fn name(&self) -> &'static str {
        "anchored"
    }

    fn extract(&self, text: &str, dimension: Dimension) -> Option<u8> {
        first_score(&ANCHORED[dimension.index()], text)
    }
}

/// "Market outlook: 85/100", "Legal compliance - 60%"
pub struct LabeledScore;

impl ScoreExtractor for LabeledScore {
    fn name(&self) -> &'static str {
        "labeled"
    }

    fn extract(&self, text: &str, dimension: Dimension) -> Option<u8> {
        first_score(&LABELED[dimension.index()], text)
    }
}

/// The Nth generic score token, where N is the dimension's canonical position
pub struct PositionalScore;

impl ScoreExtractor for PositionalScore {
    fn name(&self) -> &'static str {
        "positional"
    }

    fn extract(&self, text: &str, dimension: Dimension) -> Option<u8> {
        score_tokens(text)
            .get(dimension.index())
            .and_then(|raw| parse_score(raw))
    }
}

/// Baseline used when nothing in the text yields a score
pub fn baseline(dimension: Dimension) -> u8 {
    match dimension {
        Dimension::Market => 75,
        Dimension::Financial => 70,
        Dimension::Technical => 80,
        Dimension::Legal => 65,
        Dimension::Cultural => 75,
        Dimension::Competitive => 72,
    }
}

/// Baseline perturbed by up to ±SYNTHETIC_SPREAD, clamped to 0..=100
pub fn synthesize_score<R: Rng>(dimension: Dimension, rng: &mut R) -> u8 {
    let offset = rng.gen_range(-SYNTHETIC_SPREAD..=SYNTHETIC_SPREAD);
    (i32::from(baseline(dimension)) + offset).clamp(0, 100) as u8
}

pub fn default_chain() -> Vec<Box<dyn ScoreExtractor>> {
    vec![
        Box::new(AnchoredScore),
        Box::new(LabeledScore),
        Box::new(PositionalScore),
    ]
}
