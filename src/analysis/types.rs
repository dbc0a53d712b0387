use serde::{Deserialize, Serialize};

/// The six axes every business idea is scored on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Market,
    Financial,
    Technical,
    Legal,
    Cultural,
    Competitive,
}

impl Dimension {
    /// Canonical order. Positional score matching relies on it.
    pub const ALL: [Dimension; 6] = [
        Dimension::Market,
        Dimension::Financial,
        Dimension::Technical,
        Dimension::Legal,
        Dimension::Cultural,
        Dimension::Competitive,
    ];

    /// Weight in the overall score. The six weights sum to 1.0.
    pub fn weight(&self) -> f64 {
        match self {
            Dimension::Market => 0.25,
            Dimension::Financial => 0.25,
            Dimension::Technical => 0.15,
            Dimension::Legal => 0.15,
            Dimension::Cultural => 0.10,
            Dimension::Competitive => 0.10,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Dimension::Market => 0,
            Dimension::Financial => 1,
            Dimension::Technical => 2,
            Dimension::Legal => 3,
            Dimension::Cultural => 4,
            Dimension::Competitive => 5,
        }
    }

    /// Label used by the results view and the exported report
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Market => "Market Opportunity",
            Dimension::Financial => "Financial Viability",
            Dimension::Technical => "Technical Feasibility",
            Dimension::Legal => "Legal Compliance",
            Dimension::Cultural => "Cultural Fit",
            Dimension::Competitive => "Competitive Position",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Market => write!(f, "Market"),
            Dimension::Financial => write!(f, "Financial"),
            Dimension::Technical => write!(f, "Technical"),
            Dimension::Legal => write!(f, "Legal"),
            Dimension::Cultural => write!(f, "Cultural"),
            Dimension::Competitive => write!(f, "Competitive"),
        }
    }
}

/// One 0-100 score per dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DimensionScores {
    pub market: u8,
    pub financial: u8,
    pub technical: u8,
    pub legal: u8,
    pub cultural: u8,
    pub competitive: u8,
}

impl DimensionScores {
    pub fn get(&self, dimension: Dimension) -> u8 {
        match dimension {
            Dimension::Market => self.market,
            Dimension::Financial => self.financial,
            Dimension::Technical => self.technical,
            Dimension::Legal => self.legal,
            Dimension::Cultural => self.cultural,
            Dimension::Competitive => self.competitive,
        }
    }

    /// Sets a score, clamping anything above 100
    pub fn set(&mut self, dimension: Dimension, score: u8) {
        let score = score.min(100);
        match dimension {
            Dimension::Market => self.market = score,
            Dimension::Financial => self.financial = score,
            Dimension::Technical => self.technical = score,
            Dimension::Legal => self.legal = score,
            Dimension::Cultural => self.cultural = score,
            Dimension::Competitive => self.competitive = score,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, u8)> + '_ {
        Dimension::ALL.iter().map(move |d| (*d, self.get(*d)))
    }

    /// Fixed-weight combination of the six scores, rounded to the nearest integer
    pub fn overall(&self) -> u8 {
        let weighted: f64 = self
            .iter()
            .map(|(d, score)| f64::from(score) * d.weight())
            .sum();
        weighted.round().clamp(0.0, 100.0) as u8
    }
}

/// Textual band assigned to an overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpretation {
    #[serde(rename = "Highly Viable")]
    HighlyViable,
    #[serde(rename = "Viable with Improvements")]
    ViableWithImprovements,
    #[serde(rename = "Moderate Viability")]
    ModerateViability,
    #[serde(rename = "Requires Significant Changes")]
    RequiresSignificantChanges,
}

impl Interpretation {
    /// Lower bound of each band is inclusive
    pub fn from_score(score: u8) -> Self {
        match score {
            85.. => Interpretation::HighlyViable,
            70..=84 => Interpretation::ViableWithImprovements,
            55..=69 => Interpretation::ModerateViability,
            _ => Interpretation::RequiresSignificantChanges,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Interpretation::HighlyViable => "Highly Viable",
            Interpretation::ViableWithImprovements => "Viable with Improvements",
            Interpretation::ModerateViability => "Moderate Viability",
            Interpretation::RequiresSignificantChanges => "Requires Significant Changes",
        }
    }
}

impl std::fmt::Display for Interpretation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Display band for a single dimension score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => ScoreBand::Excellent,
            65..=79 => ScoreBand::Good,
            50..=64 => ScoreBand::Fair,
            _ => ScoreBand::Poor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "excellent",
            ScoreBand::Good => "good",
            ScoreBand::Fair => "fair",
            ScoreBand::Poor => "poor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Pending,
    Running,
    Completed,
    Error,
}

/// Status of one remote agent that took part in an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub agent_id: String,
    pub agent_name: String,
    pub status: AgentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
}

impl AgentResponse {
    pub fn completed(agent_id: impl Into<String>, agent_name: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            agent_name: agent_name.into(),
            status: AgentStatus::Completed,
            result: None,
            progress: Some(100),
        }
    }
}

/// Final structured outcome of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub overall_score: u8,
    pub interpretation: Interpretation,
    pub scores: DimensionScores,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub agent_responses: Vec<AgentResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl AnalysisResult {
    /// Builds a result whose overall score is the weighted combination of `scores`
    pub fn from_scores(
        scores: DimensionScores,
        strengths: Vec<String>,
        concerns: Vec<String>,
        recommendations: Vec<String>,
    ) -> Self {
        let overall_score = scores.overall();
        Self {
            overall_score,
            interpretation: Interpretation::from_score(overall_score),
            scores,
            strengths,
            concerns,
            recommendations,
            agent_responses: Vec::new(),
            raw_response: None,
            session_id: None,
        }
    }

    /// Overrides the overall score with a figure reported by a structured backend
    pub fn with_overall(mut self, overall_score: u8) -> Self {
        self.overall_score = overall_score.min(100);
        self.interpretation = Interpretation::from_score(self.overall_score);
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_agent_responses(mut self, responses: Vec<AgentResponse>) -> Self {
        self.agent_responses = responses;
        self
    }

    /// The sample report shown to visitors before they run their own analysis
    pub fn sample() -> Self {
        let scores = DimensionScores {
            market: 85,
            financial: 72,
            technical: 88,
            legal: 68,
            cultural: 82,
            competitive: 75,
        };
        Self::from_scores(
            scores,
            vec![
                "Strong market demand in UAE and Saudi Arabia".to_string(),
                "Scalable SaaS business model with recurring revenue".to_string(),
                "Technical implementation is feasible with existing technology".to_string(),
                "Good cultural fit for Gulf business practices".to_string(),
            ],
            vec![
                "Regulatory compliance requires additional attention".to_string(),
                "High competition in fintech space".to_string(),
                "Initial customer acquisition may be challenging".to_string(),
            ],
            vec![
                "Focus on regulatory compliance early in development".to_string(),
                "Partner with local financial institutions for credibility".to_string(),
                "Develop strong customer acquisition strategy".to_string(),
                "Consider gradual market expansion starting with UAE".to_string(),
            ],
        )
    }
}
