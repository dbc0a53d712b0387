//! Share Links
//!
//! A result travels inside the URL fragment as percent-encoded base64 JSON,
//! so a link can be opened without any stored copy.

use base64::{engine::general_purpose, Engine as _};
use tracing::{debug, warn};

use crate::analysis::AnalysisResult;

const FRAGMENT_KEY: &str = "data=";

/// JSON, then standard base64, then percent-encoding
pub fn encode_result(result: &AnalysisResult) -> serde_json::Result<String> {
    let json = serde_json::to_string(result)?;
    let b64 = general_purpose::STANDARD.encode(json);
    Ok(urlencoding::encode(&b64).into_owned())
}

/// `{origin}/results#data=<payload>`, or the bare results page if encoding fails
pub fn generate_shareable_url(origin: &str, result: &AnalysisResult) -> String {
    let base = format!("{}/results", origin.trim_end_matches('/'));
    match encode_result(result) {
        Ok(payload) => format!("{}#{}{}", base, FRAGMENT_KEY, payload),
        Err(e) => {
            warn!("Failed to encode result for sharing: {}", e);
            base
        }
    }
}

/// Decodes a fragment with or without its leading `#`. Any failure is `None`.
pub fn decode_fragment(fragment: &str) -> Option<AnalysisResult> {
    let payload = fragment.trim_start_matches('#').strip_prefix(FRAGMENT_KEY)?;
    let b64 = urlencoding::decode(payload).ok()?;
    let bytes = general_purpose::STANDARD.decode(b64.trim()).ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(result) => Some(result),
        Err(e) => {
            debug!("Shared payload is not a result: {}", e);
            None
        }
    }
}

pub fn analysis_from_url(url: &str) -> Option<AnalysisResult> {
    let (_, fragment) = url.split_once('#')?;
    decode_fragment(fragment)
}
