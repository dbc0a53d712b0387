//! Fallback Client
//!
//! Secondary analysis service with a flat request and a response that
//! already carries numeric scores.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use super::{AnalysisBackend, BackendError, BackendReply, BackendResult};
use crate::analysis::{AnalysisResult, Dimension, DimensionScores};
use crate::intake::AnalysisRequest;
use crate::interpreter::InsightKind;
use crate::utils::preview;

/// The four form fields, as the secondary service expects them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatRequest<'a> {
    pub business_description: &'a str,
    pub target_markets: &'a str,
    pub business_stage: &'a str,
    pub business_model: &'a str,
}

impl<'a> From<&'a AnalysisRequest> for FlatRequest<'a> {
    fn from(request: &'a AnalysisRequest) -> Self {
        Self {
            business_description: request.business_description(),
            target_markets: request.target_markets().slug(),
            business_stage: request.business_stage().slug(),
            business_model: request.business_model().slug(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FlatScores {
    pub market: Option<f64>,
    pub financial: Option<f64>,
    pub technical: Option<f64>,
    pub legal: Option<f64>,
    pub cultural: Option<f64>,
    pub competitive: Option<f64>,
}

impl FlatScores {
    fn get(&self, dimension: Dimension) -> Option<f64> {
        match dimension {
            Dimension::Market => self.market,
            Dimension::Financial => self.financial,
            Dimension::Technical => self.technical,
            Dimension::Legal => self.legal,
            Dimension::Cultural => self.cultural,
            Dimension::Competitive => self.competitive,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FlatAnalysis {
    pub overall_feasibility_score: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub scores: FlatScores,
    #[serde(default, deserialize_with = "null_as_default")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub concerns: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recommendations: Vec<String>,
}

/// `null` reads the same as an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn clamp_score(value: f64) -> u8 {
    if value.is_nan() {
        0
    } else {
        value.round().clamp(0.0, 100.0) as u8
    }
}

fn or_placeholders(items: Vec<String>, kind: InsightKind) -> Vec<String> {
    let items: Vec<String> = items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        kind.placeholders()
    } else {
        items
    }
}

impl FlatAnalysis {
    /// Missing dimension scores count as 0. The reported overall score is
    /// kept as-is when present.
    pub fn into_result(self) -> AnalysisResult {
        let mut scores = DimensionScores::default();
        for dimension in Dimension::ALL {
            scores.set(dimension, self.scores.get(dimension).map(clamp_score).unwrap_or(0));
        }
        let result = AnalysisResult::from_scores(
            scores,
            or_placeholders(self.strengths, InsightKind::Strengths),
            or_placeholders(self.concerns, InsightKind::Concerns),
            or_placeholders(self.recommendations, InsightKind::Recommendations),
        );
        match self.overall_feasibility_score {
            Some(overall) => result.with_overall(clamp_score(overall)),
            None => result,
        }
    }
}

pub struct FallbackClient {
    client: Client,
    url: String,
}

impl FallbackClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AnalysisBackend for FallbackClient {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn analyze(&self, request: &AnalysisRequest) -> BackendResult<BackendReply> {
        info!("Requesting fallback analysis from {}", self.url);
        let res = self
            .client
            .post(&self.url)
            .json(&FlatRequest::from(request))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: preview(&body, 200),
            });
        }

        let flat: FlatAnalysis = res
            .json()
            .await
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;
        Ok(BackendReply::Structured(flat.into_result()))
    }
}
