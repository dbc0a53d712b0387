//! Insight Extractors
//!
//! Recover strengths, concerns and recommendations from free text.

use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static::lazy_static! {
    static ref NUMBERED: Regex = Regex::new(r"^\d{1,2}[.)]\s+").unwrap();
    static ref SENTENCE_BREAK: Regex = Regex::new(r"[.!?\n]+").unwrap();
}

/// Longest list kept per insight kind
pub const MAX_INSIGHTS: usize = 5;

/// Headings longer than this are treated as prose
const MAX_HEADING_CHARS: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Strengths,
    Concerns,
    Recommendations,
}

impl InsightKind {
    pub const ALL: [InsightKind; 3] = [
        InsightKind::Strengths,
        InsightKind::Concerns,
        InsightKind::Recommendations,
    ];

    fn heading_keywords(&self) -> &'static [&'static str] {
        match self {
            InsightKind::Strengths => &["strength", "advantage", "positive"],
            InsightKind::Concerns => &["concern", "risk", "weakness", "challenge"],
            InsightKind::Recommendations => &["recommendation", "next step", "suggestion", "action item"],
        }
    }

    fn sentiment_keywords(&self) -> &'static [&'static str] {
        match self {
            InsightKind::Strengths => &[
                "strong", "opportunity", "advantage", "growing", "demand", "scalable",
                "well-positioned", "potential",
            ],
            InsightKind::Concerns => &[
                "risk", "challenge", "concern", "competition", "difficult", "barrier",
                "costly", "uncertain",
            ],
            InsightKind::Recommendations => &[
                "recommend", "should", "consider", "focus on", "partner", "prioritize",
                "develop",
            ],
        }
    }

    /// Generic statements used when the text yields nothing for this kind
    pub fn placeholders(&self) -> Vec<String> {
        let items: &[&str] = match self {
            InsightKind::Strengths => &[
                "Strong market opportunity identified",
                "Solid technical foundation",
                "Good cultural market fit",
                "Scalable business model",
            ],
            InsightKind::Concerns => &[
                "Regulatory compliance needs attention",
                "High competition in target market",
                "Customer acquisition costs may be high",
            ],
            InsightKind::Recommendations => &[
                "Focus on regulatory compliance early",
                "Develop strong differentiation strategy",
                "Build strategic partnerships",
                "Consider phased market entry",
            ],
        };
        items.iter().map(|s| s.to_string()).collect()
    }

    fn matches_heading(&self, heading: &str) -> bool {
        let lower = heading.to_lowercase();
        self.heading_keywords().iter().any(|k| lower.contains(k))
    }
}

impl std::fmt::Display for InsightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsightKind::Strengths => write!(f, "strengths"),
            InsightKind::Concerns => write!(f, "concerns"),
            InsightKind::Recommendations => write!(f, "recommendations"),
        }
    }
}

pub trait InsightExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns a non-empty list, or `None` when this strategy finds nothing
    fn extract(&self, text: &str, kind: InsightKind) -> Option<Vec<String>>;
}

fn is_symbol_bullet(line: &str) -> bool {
    ["- ", "* ", "• ", "+ ", "– "].iter().any(|p| line.starts_with(p))
}

/// Text of a bulleted or numbered line, without its marker
fn bullet_item(line: &str) -> Option<&str> {
    let line = line.trim();
    if is_symbol_bullet(line) {
        // every marker is one char followed by a space
        let mut chars = line.chars();
        chars.next();
        return Some(chars.as_str().trim());
    }
    NUMBERED.find(line).map(|m| line[m.end()..].trim())
}

fn strip_markup(text: &str) -> String {
    text.replace("**", "")
        .replace('`', "")
        .trim_start_matches('#')
        .trim()
        .to_string()
}

/// Heading text without markup, when `line` looks like a section heading
fn heading(line: &str) -> Option<String> {
    let raw = line.trim();
    if raw.is_empty() || is_symbol_bullet(raw) {
        return None;
    }
    let wrapped = raw.starts_with("**") && raw.ends_with("**") && raw.len() > 4;
    let without_number = NUMBERED.find(raw).map(|m| &raw[m.end()..]).unwrap_or(raw);
    let text = strip_markup(without_number);
    let marked = raw.starts_with('#') || wrapped || text.ends_with(':');
    if marked && text.chars().count() <= MAX_HEADING_CHARS {
        Some(text.trim_end_matches(':').trim().to_string())
    } else {
        None
    }
}

fn push_unique(items: &mut Vec<String>, item: String) {
    if !items.iter().any(|existing| existing.eq_ignore_ascii_case(&item)) {
        items.push(item);
    }
}

/// Bulleted lines under a heading such as "Strengths:" or "### Key Risks"
pub struct SectionExtractor;

impl SectionExtractor {
    fn collect_after(lines: &[&str]) -> Vec<String> {
        let mut items = Vec::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            if heading(line).is_some() {
                break;
            }
            match bullet_item(line) {
                Some(item) => {
                    let item = strip_markup(item);
                    if item.chars().count() >= 3 {
                        push_unique(&mut items, item);
                    }
                }
                // prose right under the heading is an intro, prose after the list ends it
                None if items.is_empty() => continue,
                None => break,
            }
            if items.len() >= MAX_INSIGHTS {
                break;
            }
        }
        items
    }
}

impl InsightExtractor for SectionExtractor {
    fn name(&self) -> &'static str {
        "section"
    }

    fn extract(&self, text: &str, kind: InsightKind) -> Option<Vec<String>> {
        let lines: Vec<&str> = text.lines().collect();
        lines
            .iter()
            .enumerate()
            .filter(|(_, line)| heading(line).is_some_and(|h| kind.matches_heading(&h)))
            .map(|(i, _)| Self::collect_after(&lines[i + 1..]))
            .find(|items| !items.is_empty())
    }
}

/// Sentences anywhere in the text that carry a sentiment keyword
pub struct KeywordSentenceExtractor {
    min_chars: usize,
}

impl KeywordSentenceExtractor {
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }
}

impl Default for KeywordSentenceExtractor {
    fn default() -> Self {
        Self::new(30)
    }
}

impl InsightExtractor for KeywordSentenceExtractor {
    fn name(&self) -> &'static str {
        "keyword_sentence"
    }

    fn extract(&self, text: &str, kind: InsightKind) -> Option<Vec<String>> {
        let mut items = Vec::new();
        for sentence in SENTENCE_BREAK.split(text) {
            let sentence = strip_markup(bullet_item(sentence).unwrap_or(sentence));
            if sentence.chars().count() <= self.min_chars {
                continue;
            }
            let lower = sentence.to_lowercase();
            if kind.sentiment_keywords().iter().any(|k| lower.contains(k)) {
                push_unique(&mut items, sentence);
            }
            if items.len() >= MAX_INSIGHTS {
                break;
            }
        }
        if items.is_empty() {
            None
        } else {
            Some(items)
        }
    }
}

pub fn default_chain() -> Vec<Box<dyn InsightExtractor>> {
    vec![
        Box::new(SectionExtractor),
        Box::new(KeywordSentenceExtractor::default()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
## Overall Assessment
The idea shows promise for GCC markets.

**Strengths:**
- Strong demand for SME credit in the UAE
- **Alternative data** gives a scoring edge
1. Recurring B2B revenue

### Key Risks
Two issues stand out for now.
* SAMA licensing takes time
* Incumbent banks may build in-house

Recommendations:
- Partner with a licensed bank
- Pilot in Dubai first
";

    #[test]
    fn test_section_bullets() {
        let strengths = SectionExtractor.extract(REPORT, InsightKind::Strengths).unwrap();
        assert_eq!(
            strengths,
            vec![
                "Strong demand for SME credit in the UAE",
                "Alternative data gives a scoring edge",
                "Recurring B2B revenue",
            ]
        );
    }

    #[test]
    fn test_section_skips_intro_prose() {
        let concerns = SectionExtractor.extract(REPORT, InsightKind::Concerns).unwrap();
        assert_eq!(
            concerns,
            vec!["SAMA licensing takes time", "Incumbent banks may build in-house"]
        );
    }

    #[test]
    fn test_section_until_end_of_text() {
        let recs = SectionExtractor.extract(REPORT, InsightKind::Recommendations).unwrap();
        assert_eq!(recs, vec!["Partner with a licensed bank", "Pilot in Dubai first"]);
    }

    #[test]
    fn test_section_absent() {
        let text = "Market Score: 80/100\nNothing else to say.";
        assert!(SectionExtractor.extract(text, InsightKind::Strengths).is_none());
    }

    #[test]
    fn test_section_capped() {
        let mut text = String::from("Strengths:\n");
        for i in 0..8 {
            text.push_str(&format!("- Strength number {}\n", i));
        }
        let items = SectionExtractor.extract(&text, InsightKind::Strengths).unwrap();
        assert_eq!(items.len(), MAX_INSIGHTS);
    }

    #[test]
    fn test_keyword_sentences() {
        let text = "There is strong demand for digital payments in Saudi Arabia. \
                    Costs are fine. \
                    Regulatory approval is a real risk for new entrants in Qatar.";
        let strengths = KeywordSentenceExtractor::default()
            .extract(text, InsightKind::Strengths)
            .unwrap();
        assert_eq!(strengths, vec!["There is strong demand for digital payments in Saudi Arabia"]);

        let concerns = KeywordSentenceExtractor::default()
            .extract(text, InsightKind::Concerns)
            .unwrap();
        assert_eq!(concerns, vec!["Regulatory approval is a real risk for new entrants in Qatar"]);
    }

    #[test]
    fn test_keyword_sentences_ignore_short() {
        let text = "Strong demand. Big risk.";
        assert!(KeywordSentenceExtractor::default()
            .extract(text, InsightKind::Strengths)
            .is_none());
    }

    #[test]
    fn test_placeholders_not_empty() {
        for kind in InsightKind::ALL {
            assert!(!kind.placeholders().is_empty());
        }
    }
}
