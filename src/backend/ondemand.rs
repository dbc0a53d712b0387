//! On-Demand Session Client
//!
//! Talks to the hosted multi-agent chat service: open a session with the
//! GCC agent roster, then submit one consolidated query synchronously.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use super::prompt::build_analysis_prompt;
use super::{AnalysisBackend, BackendError, BackendReply, BackendResult, RawAnalysis};
use crate::config::BackendConfig;
use crate::intake::AnalysisRequest;
use crate::utils::preview;

/// Answer of one synchronous query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryAnswer {
    pub session_id: String,
    pub answer: String,
}

pub struct OnDemandClient {
    client: Client,
    config: BackendConfig,
}

impl OnDemandClient {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post(&self, url: String, body: &Value) -> BackendResult<Value> {
        let res = self
            .client
            .post(url)
            .header("apikey", &self.config.api_key)
            .json(body)
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
        res.json()
            .await
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))
    }

    /// Opens a chat session for the configured agents and returns its id
    pub async fn create_session(&self) -> BackendResult<String> {
        let body = json!({
            "agentIds": self.config.agent_ids,
            "externalUserId": Uuid::new_v4().to_string(),
            "contextMetadata": [
                { "key": "product", "value": "gulf_validate" },
                { "key": "region", "value": "GCC" },
            ],
        });
        let json = self.post(self.url("sessions"), &body).await?;
        let session_id = parse_session_id(&json)?;
        debug!("Opened session {}", session_id);
        Ok(session_id)
    }

    pub async fn submit_query(&self, session_id: &str, query: &str) -> BackendResult<QueryAnswer> {
        let body = json!({
            "endpointId": self.config.endpoint_id,
            "query": query,
            "agentIds": self.config.agent_ids,
            "responseMode": "sync",
            "reasoningMode": self.config.reasoning_mode,
            "modelConfigs": {
                "temperature": self.config.temperature,
                "topP": 1,
                "maxTokens": 0,
                "presencePenalty": 0,
                "frequencyPenalty": 0,
            },
        });
        let json = self
            .post(self.url(&format!("sessions/{}/query", session_id)), &body)
            .await?;
        parse_answer(&json, session_id)
    }
}

/// `data.id` of a session creation reply
pub fn parse_session_id(json: &Value) -> BackendResult<String> {
    json["data"]["id"]
        .as_str()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| BackendError::MalformedResponse("session reply has no data.id".to_string()))
}

/// `data.answer` of a query reply. The session id echoed back wins over the
/// one the query was sent to.
pub fn parse_answer(json: &Value, session_id: &str) -> BackendResult<QueryAnswer> {
    let answer = json["data"]["answer"]
        .as_str()
        .ok_or_else(|| BackendError::MalformedResponse("query reply has no data.answer".to_string()))?;
    let session_id = json["data"]["sessionId"].as_str().unwrap_or(session_id);
    Ok(QueryAnswer {
        session_id: session_id.to_string(),
        answer: answer.to_string(),
    })
}

#[async_trait]
impl AnalysisBackend for OnDemandClient {
    fn name(&self) -> &str {
        "on-demand"
    }

    async fn analyze(&self, request: &AnalysisRequest) -> BackendResult<BackendReply> {
        let session_id = self.create_session().await?;
        let prompt = build_analysis_prompt(request);
        info!(
            "Submitting analysis to session {} ({} agents)",
            session_id,
            self.config.agent_ids.len()
        );
        let reply = self.submit_query(&session_id, &prompt).await?;
        debug!("Answer preview: {}", preview(&reply.answer, 100));

        Ok(BackendReply::Narrative(RawAnalysis {
            session_id: reply.session_id,
            answer: reply.answer,
            agent_ids: self.config.agent_ids.clone(),
        }))
    }
}
