//! Local Store
//!
//! Small JSON key-value file holding the last request and result between
//! runs. Values are stored as JSON strings under fixed keys. Anything
//! missing or unreadable loads as "no data".

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::analysis::AnalysisResult;
use crate::intake::AnalysisRequest;

pub const REQUEST_KEY: &str = "analysisRequest";
pub const RESULTS_KEY: &str = "analysisResults";

type Entries = BTreeMap<String, String>;

pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Entries {
        let json = match fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(_) => return Entries::new(),
        };
        serde_json::from_str(&json).unwrap_or_else(|e| {
            warn!("Ignoring unreadable store {}: {}", self.path.display(), e);
            Entries::new()
        })
    }

    async fn write_entries(&self, entries: &Entries) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create store directory")?;
        }
        let json = serde_json::to_string_pretty(entries).context("Failed to serialize store")?;
        fs::write(&self.path, json)
            .await
            .context("Failed to write store file")?;
        Ok(())
    }

    async fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut entries = self.read_entries().await;
        let json = serde_json::to_string(value).with_context(|| format!("Failed to serialize {}", key))?;
        entries.insert(key.to_string(), json);
        self.write_entries(&entries).await?;
        debug!("Stored {} in {}", key, self.path.display());
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entries = self.read_entries().await;
        let json = entries.get(key)?;
        match serde_json::from_str(json) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Stored {} is corrupt: {}", key, e);
                None
            }
        }
    }

    pub async fn save_request(&self, request: &AnalysisRequest) -> Result<()> {
        self.put(REQUEST_KEY, request).await
    }

    pub async fn load_request(&self) -> Option<AnalysisRequest> {
        self.get(REQUEST_KEY).await
    }

    pub async fn save_result(&self, result: &AnalysisResult) -> Result<()> {
        self.put(RESULTS_KEY, result).await
    }

    pub async fn load_result(&self) -> Option<AnalysisResult> {
        self.get(RESULTS_KEY).await
    }

    /// Drops both keys, keeping anything else in the file
    pub async fn clear(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut entries = self.read_entries().await;
        entries.remove(REQUEST_KEY);
        entries.remove(RESULTS_KEY);
        self.write_entries(&entries).await
    }
}
