//! Public IP lookup
//!
//! A primary JSON endpoint is tried first, then exactly one plain-text
//! fallback. Neither is retried.

use serde::Deserialize;
use std::time::Duration;

/// Lookup endpoints and request timeout
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LookupConfig {
    /// Endpoint answering `{"ip": "..."}`
    pub primary_url: String,
    /// Endpoint answering with the bare address as text
    pub fallback_url: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            primary_url: "https://api.ipify.org?format=json".to_string(),
            fallback_url: "https://icanhazip.com".to_string(),
            timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("resolution worker terminated abnormally")]
    WorkerPanicked,
}

/// Source of the signer's public IP address
pub trait IpLookup: Send + Sync {
    fn primary(&self) -> Result<String, LookupError>;
    fn fallback(&self) -> Result<String, LookupError>;
}

#[derive(Debug, Deserialize)]
struct IpResponse {
    ip: String,
}

/// Blocking HTTP lookup backed by `ureq`
pub struct HttpIpLookup {
    config: LookupConfig,
    agent: ureq::Agent,
}

impl HttpIpLookup {
    pub fn new(config: LookupConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build();
        Self { config, agent }
    }

    fn fetch(&self, url: &str) -> Result<String, LookupError> {
        let resp = self
            .agent
            .get(url)
            .set("User-Agent", "pdf-signer")
            .call()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        resp.into_string()
            .map_err(|e| LookupError::InvalidResponse(e.to_string()))
    }
}

impl Default for HttpIpLookup {
    fn default() -> Self {
        Self::new(LookupConfig::default())
    }
}

impl IpLookup for HttpIpLookup {
    fn primary(&self) -> Result<String, LookupError> {
        let body = self.fetch(&self.config.primary_url)?;
        parse_json_ip(&body)
    }

    fn fallback(&self) -> Result<String, LookupError> {
        let body = self.fetch(&self.config.fallback_url)?;
        parse_text_ip(&body)
    }
}

fn parse_json_ip(body: &str) -> Result<String, LookupError> {
    let parsed: IpResponse =
        serde_json::from_str(body).map_err(|e| LookupError::InvalidResponse(e.to_string()))?;
    non_empty(parsed.ip)
}

fn parse_text_ip(body: &str) -> Result<String, LookupError> {
    non_empty(body.trim().to_string())
}

fn non_empty(ip: String) -> Result<String, LookupError> {
    let ip = ip.trim().to_string();
    if ip.is_empty() {
        return Err(LookupError::InvalidResponse("empty address".into()));
    }
    Ok(ip)
}

/// Primary, then one fallback; `None` when both fail
pub fn resolve_public_ip(lookup: &dyn IpLookup) -> Option<String> {
    match lookup.primary() {
        Ok(ip) => return Some(ip),
        Err(err) => tracing::warn!(%err, "primary IP lookup failed, trying fallback"),
    }

    match lookup.fallback() {
        Ok(ip) => Some(ip),
        Err(err) => {
            tracing::warn!(%err, "fallback IP lookup failed");
            None
        }
    }
}
