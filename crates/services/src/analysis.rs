use std::collections::HashMap;
use std::env;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Client;

use coach_core::model::SessionId;

use crate::error::AnalysisError;
use crate::reports::RawAnalysisResult;

/// Seam over the external speech-analysis service.
#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    /// Fetch the analysis payload for a session.
    ///
    /// Returns `None` while the pipeline has not produced a result yet.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError` when the service is unconfigured or the
    /// request fails.
    async fn fetch_result(
        &self,
        session_id: SessionId,
    ) -> Result<Option<RawAnalysisResult>, AnalysisError>;

    /// Download stored recording bytes through the service, so signed
    /// storage credentials never reach the client.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError` when the service is unconfigured or the
    /// request fails.
    async fn fetch_audio(&self, object: &str) -> Result<Vec<u8>, AnalysisError>;
}

#[derive(Clone, Debug)]
pub struct AnalysisConfig {
    pub base_url: String,
    pub api_key: String,
}

impl AnalysisConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("COACH_ANALYSIS_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("COACH_ANALYSIS_BASE_URL")
            .unwrap_or_else(|_| "https://analysis.futureped.example/v1".into());
        Some(Self { base_url, api_key })
    }
}

/// HTTP client for the analysis service.
///
/// Unconfigured deployments get a disabled client whose calls fail with
/// `AnalysisError::Disabled` instead of panicking at startup.
#[derive(Clone)]
pub struct AnalysisClient {
    client: Client,
    config: Option<AnalysisConfig>,
}

impl AnalysisClient {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(AnalysisConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<AnalysisConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    fn endpoint(&self, path: &str) -> Result<(String, &AnalysisConfig), AnalysisError> {
        let config = self.config.as_ref().ok_or(AnalysisError::Disabled)?;
        let url = format!("{}/{path}", config.base_url.trim_end_matches('/'));
        Ok((url, config))
    }
}

#[async_trait]
impl AnalysisGateway for AnalysisClient {
    async fn fetch_result(
        &self,
        session_id: SessionId,
    ) -> Result<Option<RawAnalysisResult>, AnalysisError> {
        let (url, config) = self.endpoint(&format!("results/{session_id}"))?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&config.api_key)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AnalysisError::HttpStatus(response.status()));
        }

        Ok(Some(response.json().await?))
    }

    async fn fetch_audio(&self, object: &str) -> Result<Vec<u8>, AnalysisError> {
        let (url, config) = self.endpoint(&format!("audio/{object}"))?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&config.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AnalysisError::HttpStatus(response.status()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// In-memory analysis gateway for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryAnalysisGateway {
    results: Arc<Mutex<HashMap<SessionId, RawAnalysisResult>>>,
    audio: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryAnalysisGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a pipeline result for a session.
    pub fn put_result(&self, session_id: SessionId, result: RawAnalysisResult) {
        if let Ok(mut guard) = self.results.lock() {
            guard.insert(session_id, result);
        }
    }

    /// Stage recording bytes under an object key.
    pub fn put_audio(&self, object: &str, bytes: Vec<u8>) {
        if let Ok(mut guard) = self.audio.lock() {
            guard.insert(object.to_string(), bytes);
        }
    }
}

#[async_trait]
impl AnalysisGateway for InMemoryAnalysisGateway {
    async fn fetch_result(
        &self,
        session_id: SessionId,
    ) -> Result<Option<RawAnalysisResult>, AnalysisError> {
        let guard = self
            .results
            .lock()
            .map_err(|e| AnalysisError::Gateway(e.to_string()))?;
        Ok(guard.get(&session_id).cloned())
    }

    async fn fetch_audio(&self, object: &str) -> Result<Vec<u8>, AnalysisError> {
        let guard = self
            .audio
            .lock()
            .map_err(|e| AnalysisError::Gateway(e.to_string()))?;
        guard
            .get(object)
            .cloned()
            .ok_or(AnalysisError::HttpStatus(reqwest::StatusCode::NOT_FOUND))
    }
}
