//! Intake Wizard
//!
//! Four-step form state. Advancing past an invalid step is a no-op, never an error.

use serde::{Deserialize, Serialize};

use super::request::{
    AnalysisRequest, BusinessModel, BusinessStage, DocumentAttachment, TargetMarket,
    MAX_DESCRIPTION_CHARS, MIN_DESCRIPTION_CHARS,
};
use crate::utils::truncate_chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardStep {
    BusinessDetails,
    MarketSelection,
    BusinessStage,
    BusinessModel,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::BusinessDetails,
        WizardStep::MarketSelection,
        WizardStep::BusinessStage,
        WizardStep::BusinessModel,
    ];

    /// 1-based position shown in the progress header
    pub fn number(&self) -> usize {
        match self {
            WizardStep::BusinessDetails => 1,
            WizardStep::MarketSelection => 2,
            WizardStep::BusinessStage => 3,
            WizardStep::BusinessModel => 4,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::BusinessDetails => "Business Details",
            WizardStep::MarketSelection => "Market Selection",
            WizardStep::BusinessStage => "Business Stage",
            WizardStep::BusinessModel => "Business Model",
        }
    }

    fn next(&self) -> Option<WizardStep> {
        Self::ALL.get(self.number()).copied()
    }

    fn previous(&self) -> Option<WizardStep> {
        self.number().checked_sub(2).and_then(|i| Self::ALL.get(i).copied())
    }
}

#[derive(Debug, Clone)]
pub struct Wizard {
    step: WizardStep,
    description: String,
    market: Option<TargetMarket>,
    stage: Option<BusinessStage>,
    model: Option<BusinessModel>,
    document: Option<DocumentAttachment>,
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::BusinessDetails,
            description: String::new(),
            market: None,
            stage: None,
            model: None,
            document: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn description_len(&self) -> usize {
        self.description.chars().count()
    }

    /// Input beyond the form's character limit is dropped
    pub fn set_description(&mut self, text: &str) {
        self.description = truncate_chars(text, MAX_DESCRIPTION_CHARS);
    }

    pub fn select_market(&mut self, market: TargetMarket) {
        self.market = Some(market);
    }

    pub fn select_stage(&mut self, stage: BusinessStage) {
        self.stage = Some(stage);
    }

    pub fn select_model(&mut self, model: BusinessModel) {
        self.model = Some(model);
    }

    pub fn attach_document(&mut self, document: DocumentAttachment) {
        self.document = Some(document);
    }

    pub fn is_step_valid(&self) -> bool {
        self.is_valid(self.step)
    }

    fn is_valid(&self, step: WizardStep) -> bool {
        match step {
            WizardStep::BusinessDetails => self.description.trim().chars().count() >= MIN_DESCRIPTION_CHARS,
            WizardStep::MarketSelection => self.market.is_some(),
            WizardStep::BusinessStage => self.stage.is_some(),
            WizardStep::BusinessModel => self.model.is_some(),
        }
    }

    pub fn is_last_step(&self) -> bool {
        self.step == WizardStep::BusinessModel
    }

    /// Moves forward when the current step is valid. Returns the resulting step.
    pub fn next(&mut self) -> WizardStep {
        if self.is_step_valid() {
            if let Some(next) = self.step.next() {
                self.step = next;
            }
        }
        self.step
    }

    pub fn back(&mut self) -> WizardStep {
        if let Some(prev) = self.step.previous() {
            self.step = prev;
        }
        self.step
    }

    /// Builds the request once every step holds valid input
    pub fn finish(&self) -> Option<AnalysisRequest> {
        if !WizardStep::ALL.iter().all(|s| self.is_valid(*s)) {
            return None;
        }
        let request = AnalysisRequest::new(
            self.description.clone(),
            self.market?,
            self.stage?,
            self.model?,
        )
        .ok()?;
        Some(match &self.document {
            Some(doc) => request.with_document(doc.clone()),
            None => request,
        })
    }
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn description(len: usize) -> String {
        "x".repeat(len)
    }

    #[test]
    fn test_next_is_noop_on_invalid_step() {
        let mut wizard = Wizard::new();
        wizard.set_description(&description(49));
        assert!(!wizard.is_step_valid());
        assert_eq!(wizard.next(), WizardStep::BusinessDetails);

        wizard.set_description(&description(50));
        assert_eq!(wizard.next(), WizardStep::MarketSelection);
        assert_eq!(wizard.next(), WizardStep::MarketSelection);
    }

    #[test]
    fn test_whitespace_does_not_count() {
        let mut wizard = Wizard::new();
        wizard.set_description(&format!("{}{}", description(40), " ".repeat(20)));
        assert!(!wizard.is_step_valid());
    }

    #[test]
    fn test_back_is_noop_on_first_step() {
        let mut wizard = Wizard::new();
        assert_eq!(wizard.back(), WizardStep::BusinessDetails);
    }

    #[test]
    fn test_full_walk_produces_request() {
        let mut wizard = Wizard::new();
        wizard.set_description(&description(120));
        wizard.next();
        wizard.select_market(TargetMarket::AllGcc);
        wizard.next();
        wizard.select_stage(BusinessStage::Mvp);
        wizard.next();
        assert!(wizard.is_last_step());
        assert!(wizard.finish().is_none());

        wizard.select_model(BusinessModel::B2bSaas);
        assert_eq!(wizard.next(), WizardStep::BusinessModel);

        let request = wizard.finish().unwrap();
        assert_eq!(request.business_description().len(), 120);
        assert_eq!(request.target_markets(), TargetMarket::AllGcc);
        assert_eq!(request.business_stage(), BusinessStage::Mvp);
        assert_eq!(request.business_model(), BusinessModel::B2bSaas);
    }

    #[test]
    fn test_back_then_forward_keeps_selections() {
        let mut wizard = Wizard::new();
        wizard.set_description(&description(60));
        wizard.next();
        wizard.select_market(TargetMarket::Oman);
        wizard.next();
        assert_eq!(wizard.back(), WizardStep::MarketSelection);
        assert_eq!(wizard.next(), WizardStep::BusinessStage);
    }

    #[test]
    fn test_description_capped() {
        let mut wizard = Wizard::new();
        wizard.set_description(&description(600));
        assert_eq!(wizard.description_len(), 500);
    }
}
