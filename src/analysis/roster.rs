//! Agent Roster
//!
//! The specialised agents hosted by the remote multi-agent service.

use serde::{Deserialize, Serialize};

use super::AgentResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    StartupAnalyzer,
    DocumentParser,
    MarketResearch,
    FinancialFeasibility,
    TechnicalViability,
    LegalRegulatory,
    CulturalAdaptation,
    ResearchInsights,
    CompetitionAnalysis,
    SummaryScoring,
    MasterOrchestrator,
}

impl AgentRole {
    pub const ALL: [AgentRole; 11] = [
        AgentRole::StartupAnalyzer,
        AgentRole::DocumentParser,
        AgentRole::MarketResearch,
        AgentRole::FinancialFeasibility,
        AgentRole::TechnicalViability,
        AgentRole::LegalRegulatory,
        AgentRole::CulturalAdaptation,
        AgentRole::ResearchInsights,
        AgentRole::CompetitionAnalysis,
        AgentRole::SummaryScoring,
        AgentRole::MasterOrchestrator,
    ];

    /// Identifier the remote service knows this agent by
    pub fn agent_id(&self) -> &'static str {
        match self {
            AgentRole::StartupAnalyzer => "agent-1756998445",
            AgentRole::DocumentParser => "agent-1757088152",
            AgentRole::MarketResearch => "agent-1757090431",
            AgentRole::FinancialFeasibility => "agent-1757092230",
            AgentRole::TechnicalViability => "agent-1757092887",
            AgentRole::LegalRegulatory => "agent-1757095739",
            AgentRole::CulturalAdaptation => "agent-1757096389",
            AgentRole::ResearchInsights => "agent-1757097941",
            AgentRole::CompetitionAnalysis => "agent-1757098990",
            AgentRole::SummaryScoring => "agent-1757146969",
            AgentRole::MasterOrchestrator => "agent-1757149454",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AgentRole::StartupAnalyzer => "Startup Analyzer",
            AgentRole::DocumentParser => "Document Parser",
            AgentRole::MarketResearch => "Market Research",
            AgentRole::FinancialFeasibility => "Financial Feasibility",
            AgentRole::TechnicalViability => "Technical Viability",
            AgentRole::LegalRegulatory => "Legal Regulatory",
            AgentRole::CulturalAdaptation => "Cultural Adaptation",
            AgentRole::ResearchInsights => "Research Insights",
            AgentRole::CompetitionAnalysis => "Competition Analysis",
            AgentRole::SummaryScoring => "Summary Scoring",
            AgentRole::MasterOrchestrator => "Master Orchestrator",
        }
    }

    pub fn from_agent_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|role| role.agent_id() == id)
    }

    /// Ids of the full roster, in the order the service expects them
    pub fn default_agent_ids() -> Vec<String> {
        Self::ALL.iter().map(|role| role.agent_id().to_string()).collect()
    }
}

/// Marks every consulted agent as completed. Unknown ids keep their raw id as name.
pub fn completed_responses(agent_ids: &[String]) -> Vec<AgentResponse> {
    agent_ids
        .iter()
        .map(|id| {
            let name = AgentRole::from_agent_id(id)
                .map(|role| role.display_name().to_string())
                .unwrap_or_else(|| id.clone());
            AgentResponse::completed(id.clone(), name)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AgentStatus;

    #[test]
    fn test_roster_ids_are_unique() {
        let ids = AgentRole::default_agent_ids();
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(ids.len(), 11);
        assert_eq!(deduped.len(), 11);
    }

    #[test]
    fn test_completed_responses_names() {
        let ids = vec!["agent-1757090431".to_string(), "agent-custom".to_string()];
        let responses = completed_responses(&ids);
        assert_eq!(responses[0].agent_name, "Market Research");
        assert_eq!(responses[0].status, AgentStatus::Completed);
        assert_eq!(responses[1].agent_name, "agent-custom");
        assert_eq!(responses[1].progress, Some(100));
    }
}
